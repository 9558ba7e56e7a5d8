use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::errors::AppResult;
use crate::handlers::{parse_window, registration_response};
use crate::state::AppState;

/// Shared body for register/lock/unlock: boundaries arrive as strings and
/// are parsed leniently (naive timestamps are taken as UTC).
#[derive(Debug, Deserialize)]
pub struct PartitionRequest {
    pub start: String,
    pub end: String,
    pub source_name: String,
    pub provider_name: String,
}

/// POST /partitions/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<PartitionRequest>,
) -> AppResult<impl IntoResponse> {
    let window = parse_window(&req.start, &req.end)?;
    let registration = state
        .registry
        .register_partition(&req.source_name, &req.provider_name, window)
        .await?;
    Ok(registration_response(registration))
}

/// POST /partitions/lock
pub async fn lock(
    State(state): State<AppState>,
    Json(req): Json<PartitionRequest>,
) -> AppResult<impl IntoResponse> {
    let window = parse_window(&req.start, &req.end)?;
    let event = state
        .registry
        .lock(&req.source_name, &req.provider_name, window)
        .await?;
    Ok(Json(json!({ "entity": event })))
}

/// POST /partitions/unlock
pub async fn unlock(
    State(state): State<AppState>,
    Json(req): Json<PartitionRequest>,
) -> AppResult<impl IntoResponse> {
    let window = parse_window(&req.start, &req.end)?;
    let event = state
        .registry
        .unlock(&req.source_name, &req.provider_name, window)
        .await?;
    Ok(Json(json!({ "entity": event })))
}
