//! OAuth 2.0 core types and data structures.
//!
//! Defines enums and structs for grants, tokens, clients, and requests.

use crate::errors::OAuthError;
use base64::prelude::*;
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// OAuth 2.0 Grant Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    ClientCredentials,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::ClientCredentials => "client_credentials",
        }
    }
}

impl TryFrom<&str> for GrantType {
    type Error = OAuthError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "client_credentials" => Ok(GrantType::ClientCredentials),
            other => Err(OAuthError::UnsupportedGrantType(other.to_string())),
        }
    }
}

/// OAuth 2.0 Token Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Bearer,
}

/// Registered OAuth client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClient {
    /// Unique client identifier
    pub client_id: String,
    /// Client secret
    pub client_secret: String,
    /// Domain the client was registered for
    pub domain: String,
    /// Grant types allowed for this client
    pub grant_types: Vec<GrantType>,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

/// OAuth Access Token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The access token
    pub token: String,
    /// Token type
    pub token_type: TokenType,
    /// Client ID
    pub client_id: String,
    /// Granted scope
    pub scope: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token Exchange Request
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// Grant type
    pub grant_type: GrantType,
    /// Client ID
    pub client_id: Option<String>,
    /// Client secret
    pub client_secret: Option<String>,
    /// Requested scope
    pub scope: Option<String>,
}

/// Token Response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token
    pub access_token: String,
    /// Token type
    pub token_type: TokenType,
    /// Expires in seconds
    pub expires_in: u64,
    /// Granted scope
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenResponse {
    pub fn new(
        access_token: String,
        token_type: TokenType,
        expires_in: u64,
        scope: Option<String>,
    ) -> Self {
        Self {
            access_token,
            token_type,
            expires_in,
            scope,
        }
    }
}

/// OAuth Error Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthErrorResponse {
    /// Error code
    pub error: String,
    /// Error description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl OAuthErrorResponse {
    pub fn new(error: &str, error_description: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            error_description: Some(error_description.into()),
        }
    }

    /// HTTP status for the error code (RFC 6749 Section 5.2)
    pub fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "invalid_client" | "unauthorized_client" => StatusCode::UNAUTHORIZED,
            "server_error" => StatusCode::INTERNAL_SERVER_ERROR,
            "temporarily_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<&OAuthError> for OAuthErrorResponse {
    fn from(error: &OAuthError) -> Self {
        Self::new(error.error_code(), error.description())
    }
}

/// Generate a secure random token
pub fn generate_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.r#gen();
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Validate a space-delimited scope list (RFC 6749 Section 3.3)
///
/// Scope tokens are built from `%x21 / %x23-5B / %x5D-7E`: printable ASCII
/// without the double quote and the backslash.
pub fn validate_scope(scope: &str) -> bool {
    scope
        .split(' ')
        .filter(|s| !s.is_empty())
        .all(|s| s.bytes().all(|b| matches!(b, 0x21 | 0x23..=0x5B | 0x5D..=0x7E)))
}

/// Parse scope string into a set
pub fn parse_scope(scope: &str) -> HashSet<String> {
    scope.split_whitespace().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generate_token_is_url_safe_and_unique() {
        let first = generate_token();
        let second = generate_token();

        assert_ne!(first, second);
        // 32 bytes, base64url without padding
        assert_eq!(first.len(), 43);
        assert!(
            first
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_validate_scope() {
        assert!(validate_scope("all"));
        assert!(validate_scope("read write"));
        assert!(validate_scope("api:read offline_access"));
        assert!(validate_scope("read.all"));
        assert!(validate_scope("https://api.example.com/read read;write"));
        assert!(validate_scope(""));
        assert!(!validate_scope("all\"scope"));
        assert!(!validate_scope("read\\write"));
        assert!(!validate_scope("read\twrite"));
        assert!(!validate_scope("lecture\u{e9}"));
    }

    #[test]
    fn test_parse_scope() {
        let scopes = parse_scope("read  write read");
        assert_eq!(scopes.len(), 2);
        assert!(scopes.contains("read"));
        assert!(scopes.contains("write"));
    }

    #[test]
    fn test_access_token_expiry() {
        let now = Utc::now();
        let token = AccessToken {
            token: "token".to_string(),
            token_type: TokenType::Bearer,
            client_id: "client".to_string(),
            scope: None,
            created_at: now - Duration::hours(2),
            expires_at: now - Duration::seconds(1),
        };
        assert!(token.is_expired(now));
        assert!(!token.is_expired(now - Duration::minutes(1)));
    }

    #[test]
    fn test_error_response_status() {
        let response = OAuthErrorResponse::from(&OAuthError::InvalidClient(
            "Client not found".to_string(),
        ));
        assert_eq!(response.error, "invalid_client");
        assert_eq!(response.error_description.as_deref(), Some("Client not found"));
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

        let response = OAuthErrorResponse::new("unsupported_grant_type", "password");
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = OAuthErrorResponse::new("server_error", "boom");
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error_description"], "boom");
    }

    #[test]
    fn test_grant_type_parsing() {
        assert_eq!(
            GrantType::try_from("client_credentials").unwrap(),
            GrantType::ClientCredentials
        );
        assert!(matches!(
            GrantType::try_from("password"),
            Err(OAuthError::UnsupportedGrantType(_))
        ));
    }

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse::new("abc".to_string(), TokenType::Bearer, 7200, None);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["access_token"], "abc");
        assert_eq!(value["token_type"], "Bearer");
        assert_eq!(value["expires_in"], 7200);
        assert!(value.get("scope").is_none());
    }
}
