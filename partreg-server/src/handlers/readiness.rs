use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use partreg_core::Readiness;

use crate::errors::AppResult;
use crate::handlers::parse_window;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReadinessQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub is_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /sources/{source_name}/check_readiness?start=..&end=..
///
/// Always 200 for a well-formed window: an unknown source or an empty
/// registry is a not-ready verdict, not an error. Only a malformed window
/// is a 400.
pub async fn check(
    State(state): State<AppState>,
    Path(source_name): Path<String>,
    Query(query): Query<ReadinessQuery>,
) -> AppResult<Json<ReadinessResponse>> {
    let window = parse_window(&query.start, &query.end)?;
    let verdict = state.registry.check_readiness(&source_name, window).await?;
    let response = match verdict {
        Readiness::Ready => ReadinessResponse {
            is_ready: true,
            message: None,
        },
        Readiness::NotReady { reason } => ReadinessResponse {
            is_ready: false,
            message: Some(reason),
        },
    };
    Ok(Json(response))
}
