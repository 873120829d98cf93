//! Trait-based storage abstractions with an in-memory backend.

pub mod inmemory;
pub mod traits;

// Re-export commonly used types and traits
pub use inmemory::MemoryOAuthStorage;
pub use traits::*;

use std::sync::Arc;

/// Create the in-memory storage backend, optionally bounded in client count
pub fn create_storage_backend(max_clients: Option<usize>) -> Arc<dyn OAuthStorage> {
    match max_clients {
        Some(max_clients) => Arc::new(MemoryOAuthStorage::with_max_clients(max_clients)),
        None => Arc::new(MemoryOAuthStorage::new()),
    }
}
