//! Handles GET /credentials - Issues a new client id and secret pair

use axum::{Json, extract::State};

use super::context::AppState;
use crate::errors::Result;
use crate::oauth::clients::ClientCredentials;

/// GET /credentials - Registers a client and returns its credentials
pub async fn handle_credentials(State(state): State<AppState>) -> Result<Json<ClientCredentials>> {
    let credentials = state.client_registration_service.register_client().await?;
    Ok(Json(credentials))
}
