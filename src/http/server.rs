//! Main router configuration assembling the credential, token and protected endpoints.

use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use super::{
    context::AppState, handler_credentials::handle_credentials,
    handler_oauth::handle_oauth_token, handler_protected::handle_protected,
    middleware_auth::require_bearer_token,
};

/// Build the application router
pub fn build_router(ctx: AppState) -> Router {
    // Routes that require a valid access token
    let protected_routes = Router::new()
        .route("/protected", get(handle_protected))
        .route_layer(middleware::from_fn_with_state(
            ctx.clone(),
            require_bearer_token,
        ));

    Router::new()
        .route("/token", get(handle_oauth_token).post(handle_oauth_token))
        .route("/credentials", get(handle_credentials))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
