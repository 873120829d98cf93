//! Storage trait definitions for OAuth data.
//!
//! Defines async storage interfaces for clients and access tokens that can be
//! implemented by various backend providers.

use crate::errors::StorageError;
use crate::oauth::types::*;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Trait for storing and retrieving OAuth clients
#[async_trait]
pub trait OAuthClientStore {
    /// Store a client, replacing any existing record with the same ID
    async fn store_client(&self, client: &OAuthClient) -> Result<()>;

    /// Retrieve a client by ID
    async fn get_client(&self, client_id: &str) -> Result<Option<OAuthClient>>;

    /// Number of registered clients
    async fn count_clients(&self) -> Result<usize>;
}

/// Trait for storing and retrieving access tokens
#[async_trait]
pub trait AccessTokenStore {
    /// Store a new access token
    async fn store_token(&self, token: &AccessToken) -> Result<()>;

    /// Retrieve an access token, expired or not
    async fn get_token(&self, token: &str) -> Result<Option<AccessToken>>;

    /// Clean up expired tokens
    async fn cleanup_expired_tokens(&self) -> Result<usize>;
}

/// Combined OAuth storage trait
pub trait OAuthStorage: OAuthClientStore + AccessTokenStore + Send + Sync {}

impl<T> OAuthStorage for T where T: OAuthClientStore + AccessTokenStore + Send + Sync {}
