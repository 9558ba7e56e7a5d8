use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;

use crate::errors::AppResult;
use crate::handlers::registration_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterSourceRequest {
    pub source_name: String,
    pub owner: String,
}

/// POST /sources/register
///
/// The response includes the source's access token; registering the same
/// name again returns the original registration, token included.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterSourceRequest>,
) -> AppResult<impl IntoResponse> {
    let registration = state
        .registry
        .register_source(req.source_name, req.owner)
        .await?;
    Ok(registration_response(registration))
}
