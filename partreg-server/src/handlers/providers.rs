use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::errors::AppResult;
use crate::handlers::registration_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterProviderRequest {
    pub provider_name: String,
    pub access_token: String,
}

/// POST /providers/register
///
/// The token is stored verbatim; whether it grants access to any source is
/// only checked when the provider touches a partition.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterProviderRequest>,
) -> AppResult<impl IntoResponse> {
    let registration = state
        .registry
        .register_provider(req.provider_name, req.access_token)
        .await?;
    Ok(registration_response(registration))
}
