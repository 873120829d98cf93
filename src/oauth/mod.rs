//! OAuth 2.0 client-credentials authorization server and bearer-token resource server.

pub mod auth_server;
pub mod clients;
pub mod resource_server;
pub mod types;

// Re-export frequently used items from each module
pub use crate::storage::{
    inmemory::MemoryOAuthStorage,
    traits::{AccessTokenStore, OAuthClientStore, OAuthStorage},
};
pub use auth_server::{AuthorizationServer, ClientAuthentication, ClientInfoHandler, TokenForm};
pub use clients::{ClientCredentials, ClientRegistrationService, generate_credentials};
pub use resource_server::{ResourceServer, TokenValidationResult, TokenValidator};
pub use types::{
    AccessToken, GrantType, OAuthClient, OAuthErrorResponse, TokenRequest, TokenResponse,
    TokenType, parse_scope,
};
