//! Handles GET|POST /token - Issues access tokens for the client credentials grant

use axum::{
    body::Bytes,
    extract::{RawQuery, State, rejection::BytesRejection},
    http::{HeaderMap, Method, header},
    response::Response,
};

use super::context::AppState;
use crate::errors::OAuthError;
use crate::oauth::auth_server::TokenForm;

/// GET|POST /token - Parameters come from the query string and, for
/// urlencoded requests, the body, body values taking precedence
pub async fn handle_oauth_token(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let query = TokenForm::from_urlencoded(query.unwrap_or_default().as_bytes());

    let form = if is_form_urlencoded(&headers) {
        match body {
            Ok(body) => TokenForm::from_urlencoded(&body).or(query),
            Err(rejection) => {
                return state.auth_server.reject_token_request(
                    &OAuthError::InvalidRequest(format!("Unreadable request body: {}", rejection)),
                );
            }
        }
    } else {
        query
    };

    state
        .auth_server
        .handle_token_request(&method, &headers, form)
        .await
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}
