//! OAuth 2.0 resource server implementation.
//!
//! Protects endpoints with bearer access token validation (RFC 6750).

use crate::errors::OAuthError;
use crate::oauth::types::*;
use crate::storage::traits::{AccessTokenStore, OAuthStorage};
use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

/// Query parameter carrying an access token (RFC 6750 Section 2.3)
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Capability to decide whether a request carries a valid bearer token
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validate the bearer token found in `headers` or the `query` string
    async fn validate_bearer_token(
        &self,
        headers: &HeaderMap,
        query: Option<&str>,
    ) -> Result<TokenValidationResult, OAuthError>;
}

/// OAuth Resource Server for protecting APIs
pub struct ResourceServer {
    storage: Arc<dyn OAuthStorage>,
}

impl ResourceServer {
    /// Create a new resource server
    pub fn new(storage: Arc<dyn OAuthStorage>) -> Self {
        Self { storage }
    }

    /// Extract access token from the Authorization header, falling back to the query string
    fn extract_access_token(
        &self,
        headers: &HeaderMap,
        query: Option<&str>,
    ) -> Result<String, OAuthError> {
        if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
            let auth_str = auth_header.to_str().map_err(|e| {
                OAuthError::InvalidRequest(format!("Invalid Authorization header: {}", e))
            })?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Ok(token.to_string());
                }
            }
        }

        query
            .and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == ACCESS_TOKEN_PARAM)
                    .map(|(_, value)| value.into_owned())
            })
            .filter(|token| !token.is_empty())
            .ok_or_else(|| OAuthError::InvalidRequest("invalid access token".to_string()))
    }
}

#[async_trait]
impl TokenValidator for ResourceServer {
    async fn validate_bearer_token(
        &self,
        headers: &HeaderMap,
        query: Option<&str>,
    ) -> Result<TokenValidationResult, OAuthError> {
        let token = self.extract_access_token(headers, query)?;

        let access_token = self
            .storage
            .get_token(&token)
            .await
            .map_err(|e| OAuthError::ServerError(format!("Storage error: {:?}", e)))?
            .ok_or_else(|| OAuthError::InvalidToken("invalid access token".to_string()))?;

        if access_token.is_expired(Utc::now()) {
            return Err(OAuthError::InvalidToken("expired access token".to_string()));
        }

        tracing::debug!(client_id = %access_token.client_id, "validated bearer token");

        Ok(TokenValidationResult {
            client_id: access_token.client_id.clone(),
            scopes: access_token
                .scope
                .as_ref()
                .map(|s| parse_scope(s))
                .unwrap_or_default(),
            access_token,
        })
    }
}

/// Result of token validation
#[derive(Debug, Clone)]
pub struct TokenValidationResult {
    /// The validated access token
    pub access_token: AccessToken,
    /// Client ID that owns this token
    pub client_id: String,
    /// Scopes granted to this token
    pub scopes: HashSet<String>,
}
