//! In-memory storage implementations
//!
//! Everything lives for the lifetime of the process and is lost on restart.

mod oauth;

pub use oauth::MemoryOAuthStorage;
