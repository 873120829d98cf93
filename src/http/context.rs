//! Application state and request context management.

use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::Config;
use crate::oauth::{
    auth_server::AuthorizationServer,
    clients::registration::ClientRegistrationService,
    resource_server::{ResourceServer, TokenValidator},
};
use crate::storage::traits::OAuthStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// OAuth storage for clients and tokens
    pub oauth_storage: Arc<dyn OAuthStorage>,
    /// Token endpoint engine
    pub auth_server: Arc<AuthorizationServer>,
    /// Bearer token validation used by protected routes
    pub token_validator: Arc<dyn TokenValidator>,
    /// Issues and records client credentials
    pub client_registration_service: Arc<ClientRegistrationService>,
}

impl AppState {
    /// Wire the OAuth services around a shared storage backend
    pub fn new(config: Arc<Config>, oauth_storage: Arc<dyn OAuthStorage>) -> Self {
        let auth_server = AuthorizationServer::new(oauth_storage.clone())
            .allow_get_access_request(*config.allow_get_access_request.as_ref())
            .with_client_info_handler(config.client_info_handler)
            .with_access_token_expiration(*config.access_token_expiration.as_ref());

        let client_registration_service = ClientRegistrationService::new(
            oauth_storage.clone(),
            config.client_default_domain.clone(),
        );

        Self {
            token_validator: Arc::new(ResourceServer::new(oauth_storage.clone())),
            auth_server: Arc::new(auth_server),
            client_registration_service: Arc::new(client_registration_service),
            oauth_storage,
            config,
        }
    }
}

impl FromRef<AppState> for Arc<dyn TokenValidator> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.token_validator.clone()
    }
}
