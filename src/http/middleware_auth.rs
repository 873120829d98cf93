//! Bearer token authentication middleware.
//!
//! Guards protected routes: a request reaches the inner handler only when it
//! carries a valid access token, either as `Authorization: Bearer <token>` or
//! as the `access_token` query parameter.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::oauth::resource_server::TokenValidator;

/// Validate the bearer token and forward the request unchanged.
///
/// On success the [`TokenValidationResult`](crate::oauth::TokenValidationResult)
/// is placed in the request extensions for downstream handlers. On failure
/// the request is answered with `400 Bad Request` and the error text.
pub async fn require_bearer_token(
    State(validator): State<Arc<dyn TokenValidator>>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers().clone();
    let query = request.uri().query().map(str::to_string);

    let validation = validator
        .validate_bearer_token(&headers, query.as_deref())
        .await;

    match validation {
        Ok(token_info) => {
            request.extensions_mut().insert(token_info);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(error = %err, "bearer token rejected");
            (StatusCode::BAD_REQUEST, err.description().to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::resource_server::{ResourceServer, TokenValidationResult};
    use crate::oauth::types::{AccessToken, TokenType};
    use crate::storage::inmemory::MemoryOAuthStorage;
    use crate::storage::traits::AccessTokenStore;
    use axum::{Extension, Router, body::Body, middleware, routing::get};
    use chrono::{Duration, Utc};
    use tower::ServiceExt;

    async fn protected_app() -> Router {
        let storage = Arc::new(MemoryOAuthStorage::new());
        let now = Utc::now();
        storage
            .store_token(&AccessToken {
                token: "valid-token".to_string(),
                token_type: TokenType::Bearer,
                client_id: "a1b2c3d4".to_string(),
                scope: None,
                created_at: now,
                expires_at: now + Duration::hours(2),
            })
            .await
            .unwrap();

        let validator: Arc<dyn TokenValidator> = Arc::new(ResourceServer::new(storage));

        Router::new()
            .route(
                "/",
                get(|Extension(token_info): Extension<TokenValidationResult>| async move {
                    token_info.client_id
                }),
            )
            .route_layer(middleware::from_fn_with_state(
                validator,
                require_bearer_token,
            ))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_forwards_with_valid_token() {
        let response = protected_app()
            .await
            .oneshot(
                http::Request::builder()
                    .uri("/?access_token=valid-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "a1b2c3d4");
    }

    #[tokio::test]
    async fn test_rejects_missing_token() {
        let response = protected_app()
            .await
            .oneshot(http::Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "invalid access token");
    }

    #[tokio::test]
    async fn test_rejects_unknown_bearer_token() {
        let response = protected_app()
            .await
            .oneshot(
                http::Request::builder()
                    .uri("/")
                    .header("Authorization", "Bearer other-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
