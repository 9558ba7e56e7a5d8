//! Request handlers, one module per resource.

pub mod partitions;
pub mod providers;
pub mod readiness;
pub mod sources;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;

use partreg_core::Registration;
use partreg_model::{Window, parse_timestamp};

use crate::errors::{AppError, AppResult};

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "partition registry",
        "message": "see /sources/register, /providers/register, /partitions/register, \
                    /partitions/lock, /partitions/unlock and \
                    /sources/{source_name}/check_readiness",
    }))
}

/// Map a registration outcome onto the wire: a fresh entity is a plain 200,
/// an already-registered one is a 409 that still carries the stored entity.
pub(crate) fn registration_response<T: Serialize>(
    registration: Registration<T>,
) -> impl IntoResponse {
    match registration {
        Registration::Created(entity) => {
            (StatusCode::OK, Json(json!({ "entity": entity }))).into_response()
        }
        Registration::Existing(entity) => (
            StatusCode::CONFLICT,
            Json(json!({
                "message": "already registered",
                "entity": entity,
            })),
        )
            .into_response(),
    }
}

/// Parse `(start, end)` wire strings into a window. Boundary format errors
/// become 400s before the service is ever called.
pub(crate) fn parse_window(start: &str, end: &str) -> AppResult<Window> {
    let start = parse_timestamp(start).map_err(AppError::from)?;
    let end = parse_timestamp(end).map_err(AppError::from)?;
    Ok(Window::new(start, end))
}
