//! Client credential issuance.
//!
//! Generates short random client identifiers and secrets and records them in
//! the client registry.

use crate::errors::ClientRegistrationError;
use crate::oauth::types::*;
use crate::storage::traits::{OAuthClientStore, OAuthStorage};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Length of issued client identifiers and secrets
pub const CREDENTIAL_LENGTH: usize = 8;

/// Attempts at drawing a client identifier not already registered
const MAX_IDENTIFIER_ATTEMPTS: usize = 8;

/// Freshly issued client credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientCredentials {
    #[serde(rename = "CLIENT_ID")]
    pub client_id: String,
    #[serde(rename = "CLIENT_SECRET")]
    pub client_secret: String,
}

/// Generate a new client id and secret pair
pub fn generate_credentials() -> ClientCredentials {
    ClientCredentials {
        client_id: short_uuid(),
        client_secret: short_uuid(),
    }
}

fn short_uuid() -> String {
    let mut value = Uuid::new_v4().hyphenated().to_string();
    value.truncate(CREDENTIAL_LENGTH);
    value
}

/// Client Registration Service
pub struct ClientRegistrationService {
    storage: Arc<dyn OAuthStorage>,
    /// Domain recorded on every issued client
    default_domain: String,
}

impl ClientRegistrationService {
    /// Create a new client registration service
    pub fn new(storage: Arc<dyn OAuthStorage>, default_domain: impl Into<String>) -> Self {
        Self {
            storage,
            default_domain: default_domain.into(),
        }
    }

    /// Issue credentials for a new client and store its record
    pub async fn register_client(&self) -> Result<ClientCredentials, ClientRegistrationError> {
        self.register_client_with(generate_credentials).await
    }

    async fn register_client_with<G>(
        &self,
        mut generate: G,
    ) -> Result<ClientCredentials, ClientRegistrationError>
    where
        G: FnMut() -> ClientCredentials + Send,
    {
        let mut attempts = 0;
        let credentials = loop {
            if attempts == MAX_IDENTIFIER_ATTEMPTS {
                return Err(ClientRegistrationError::IdentifierExhausted(attempts));
            }
            attempts += 1;

            let candidate = generate();
            if self.storage.get_client(&candidate.client_id).await?.is_none() {
                break candidate;
            }
            tracing::debug!(client_id = %candidate.client_id, "client identifier in use");
        };

        let client = OAuthClient {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            domain: self.default_domain.clone(),
            grant_types: vec![GrantType::ClientCredentials],
            created_at: Utc::now(),
        };

        self.storage.store_client(&client).await?;

        let registered_clients = self.storage.count_clients().await.ok();
        tracing::info!(
            client_id = %client.client_id,
            registered_clients = ?registered_clients,
            "registered client"
        );

        Ok(credentials)
    }
}
