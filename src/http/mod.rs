//! Axum HTTP server handlers and middleware for credential issuance, token and protected endpoints.

pub mod context;
mod handler_credentials;
mod handler_oauth;
mod handler_protected;
pub mod middleware_auth;
pub mod server;

pub use context::AppState;
pub use server::build_router;
