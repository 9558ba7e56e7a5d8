use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// The full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/sources/register", post(handlers::sources::register))
        .route("/providers/register", post(handlers::providers::register))
        .route("/partitions/register", post(handlers::partitions::register))
        .route("/partitions/lock", post(handlers::partitions::lock))
        .route("/partitions/unlock", post(handlers::partitions::unlock))
        .route(
            "/sources/{source_name}/check_readiness",
            get(handlers::readiness::check),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
