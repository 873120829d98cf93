//! Standardized error types following the `error-ccgate-<domain>-<number>` format.

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Configuration errors that occur during application startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error when PORT cannot be parsed
    #[error("error-ccgate-config-1 Parsing PORT into u16 failed: {0:?}")]
    PortParsingFailed(std::num::ParseIntError),

    /// Error when version information is not available
    #[error("error-ccgate-config-2 One of GIT_HASH or CARGO_PKG_VERSION must be set")]
    VersionNotSet,

    /// Error when duration string cannot be parsed
    #[error("error-ccgate-config-3 Failed to parse duration '{0}': {1}")]
    DurationParsingFailed(String, String),

    /// Error when boolean string cannot be parsed
    #[error(
        "error-ccgate-config-4 Failed to parse boolean '{0}': expected true/false/1/0/yes/no/on/off"
    )]
    BoolParsingFailed(String),

    /// Error when the client info handler name is unknown
    #[error("error-ccgate-config-5 Unknown client info handler '{0}': expected form or basic")]
    UnknownClientInfoHandler(String),

    /// Error when the client capacity cannot be parsed
    #[error("error-ccgate-config-6 Parsing MAX_CLIENTS into usize failed: {0:?}")]
    CapacityParsingFailed(std::num::ParseIntError),

    /// Error when a period that must be positive is zero
    #[error("error-ccgate-config-7 Duration '{0}' must be greater than zero")]
    ZeroDuration(String),
}

/// OAuth-related errors
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Invalid client credentials
    #[error("error-ccgate-oauth-1 Invalid client credentials: {0}")]
    InvalidClient(String),

    /// Unsupported grant type
    #[error("error-ccgate-oauth-2 Unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    /// Invalid scope
    #[error("error-ccgate-oauth-3 Invalid scope: {0}")]
    InvalidScope(String),

    /// Invalid request
    #[error("error-ccgate-oauth-4 Invalid request: {0}")]
    InvalidRequest(String),

    /// Unauthorized client
    #[error("error-ccgate-oauth-5 Unauthorized client: {0}")]
    UnauthorizedClient(String),

    /// Invalid or expired access token
    #[error("error-ccgate-oauth-6 Invalid access token: {0}")]
    InvalidToken(String),

    /// Server error
    #[error("error-ccgate-oauth-7 Server error: {0}")]
    ServerError(String),
}

impl OAuthError {
    /// OAuth 2.0 error code (RFC 6749 Section 5.2, RFC 6750 Section 3.1)
    pub fn error_code(&self) -> &'static str {
        match self {
            OAuthError::InvalidClient(_) => "invalid_client",
            OAuthError::UnsupportedGrantType(_) => "unsupported_grant_type",
            OAuthError::InvalidScope(_) => "invalid_scope",
            OAuthError::InvalidRequest(_) => "invalid_request",
            OAuthError::UnauthorizedClient(_) => "unauthorized_client",
            OAuthError::InvalidToken(_) => "invalid_token",
            OAuthError::ServerError(_) => "server_error",
        }
    }

    /// Detail returned to callers, without the numbered prefix used in logs
    pub fn description(&self) -> &str {
        match self {
            OAuthError::InvalidClient(detail)
            | OAuthError::UnsupportedGrantType(detail)
            | OAuthError::InvalidScope(detail)
            | OAuthError::InvalidRequest(detail)
            | OAuthError::UnauthorizedClient(detail)
            | OAuthError::InvalidToken(detail)
            | OAuthError::ServerError(detail) => detail,
        }
    }

    /// Whether the error is an engine-side fault rather than a protocol failure
    pub fn is_internal(&self) -> bool {
        matches!(self, OAuthError::ServerError(_))
    }
}

/// Client registration errors
#[derive(Debug, Error)]
pub enum ClientRegistrationError {
    /// Client record could not be persisted
    #[error("error-ccgate-client-1 Failed to store client: {0}")]
    StoreFailed(#[from] StorageError),

    /// No unused client identifier was found
    #[error("error-ccgate-client-2 No unused client identifier after {0} attempts")]
    IdentifierExhausted(usize),
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Error when a storage lock is poisoned
    #[error("error-ccgate-storage-1 Lock error: {0}")]
    LockFailed(String),

    /// Error when the store refuses new records
    #[error("error-ccgate-storage-2 Capacity exceeded: {0}")]
    CapacityExceeded(String),
}

pub type Result<T> = std::result::Result<T, ClientRegistrationError>;

impl IntoResponse for ClientRegistrationError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "client registration failed");
        let body = serde_json::json!({
            "error": "server_error",
            "error_description": "Client credentials could not be registered",
        });
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_error_codes() {
        let invalid_client = OAuthError::InvalidClient("Client not found".to_string());
        assert_eq!(invalid_client.error_code(), "invalid_client");
        assert!(!invalid_client.is_internal());

        let grant = OAuthError::UnsupportedGrantType("password".to_string());
        assert_eq!(grant.error_code(), "unsupported_grant_type");
        assert!(!grant.is_internal());

        let server = OAuthError::ServerError("boom".to_string());
        assert_eq!(server.error_code(), "server_error");
        assert!(server.is_internal());
    }

    #[test]
    fn test_error_message_format() {
        let err = OAuthError::InvalidToken("expired access token".to_string());
        assert_eq!(
            err.to_string(),
            "error-ccgate-oauth-6 Invalid access token: expired access token"
        );

        let err = ClientRegistrationError::from(StorageError::CapacityExceeded(
            "client registry is full".to_string(),
        ));
        assert!(err.to_string().starts_with("error-ccgate-client-1"));
        assert!(err.to_string().contains("client registry is full"));
    }

    #[test]
    fn test_description_omits_prefix() {
        let err = OAuthError::InvalidRequest("invalid access token".to_string());
        assert_eq!(err.description(), "invalid access token");
        assert!(err.to_string().starts_with("error-ccgate-oauth-4"));

        let err = OAuthError::UnsupportedGrantType("password".to_string());
        assert_eq!(err.description(), "password");
    }
}
