//! Handles GET /protected - Bearer-protected demo endpoint

use axum::extract::Extension;

use crate::oauth::resource_server::TokenValidationResult;

pub const PROTECTED_GREETING: &str = "Hello, I'm protected";

/// GET /protected - Reachable only with a valid access token
pub async fn handle_protected(
    Extension(token_info): Extension<TokenValidationResult>,
) -> &'static str {
    tracing::debug!(
        client_id = %token_info.client_id,
        scopes = ?token_info.scopes,
        "protected resource accessed"
    );

    PROTECTED_GREETING
}
