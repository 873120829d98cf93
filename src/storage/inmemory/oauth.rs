//! In-memory OAuth storage implementation
//!
//! Clients and access tokens are kept in mutex-guarded maps shared by all
//! request handlers.

use crate::errors::StorageError;
use crate::oauth::types::*;
use crate::storage::traits::*;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

pub type Result<T> = std::result::Result<T, StorageError>;

/// In-memory implementation for OAuth storage
#[derive(Default)]
pub struct MemoryOAuthStorage {
    clients: Mutex<HashMap<String, OAuthClient>>,
    access_tokens: Mutex<HashMap<String, AccessToken>>,
    max_clients: Option<usize>,
}

impl MemoryOAuthStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses new clients once `max_clients` are registered
    pub fn with_max_clients(max_clients: usize) -> Self {
        Self {
            max_clients: Some(max_clients),
            ..Self::default()
        }
    }
}

#[async_trait]
impl OAuthClientStore for MemoryOAuthStorage {
    async fn store_client(&self, client: &OAuthClient) -> Result<()> {
        let mut clients = self
            .clients
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        if let Some(max_clients) = self.max_clients {
            if !clients.contains_key(&client.client_id) && clients.len() >= max_clients {
                return Err(StorageError::CapacityExceeded(format!(
                    "client registry is full ({} clients)",
                    max_clients
                )));
            }
        }

        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn get_client(&self, client_id: &str) -> Result<Option<OAuthClient>> {
        let clients = self
            .clients
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;
        Ok(clients.get(client_id).cloned())
    }

    async fn count_clients(&self) -> Result<usize> {
        let clients = self
            .clients
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;
        Ok(clients.len())
    }
}

#[async_trait]
impl AccessTokenStore for MemoryOAuthStorage {
    async fn store_token(&self, token: &AccessToken) -> Result<()> {
        let mut tokens = self
            .access_tokens
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn get_token(&self, token: &str) -> Result<Option<AccessToken>> {
        let tokens = self
            .access_tokens
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;
        Ok(tokens.get(token).cloned())
    }

    async fn cleanup_expired_tokens(&self) -> Result<usize> {
        let mut tokens = self
            .access_tokens
            .lock()
            .map_err(|e| StorageError::LockFailed(e.to_string()))?;

        let now = Utc::now();
        let initial_count = tokens.len();
        tokens.retain(|_, token| !token.is_expired(now));

        Ok(initial_count - tokens.len())
    }
}
