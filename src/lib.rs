//! ccgate library crate.
//!
//! Issues OAuth 2.0 client credentials, exchanges them for bearer access
//! tokens through the client credentials grant, and guards resources behind
//! bearer token validation.

pub mod config;
pub mod errors;
pub mod http;
pub mod oauth;
pub mod storage;
