//! HTTP boundary for the partition readiness registry.
//!
//! Thin axum layer over [`partreg_core::RegistryService`]: handlers decode
//! requests, call the service, and map its outcomes onto status codes.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use state::AppState;
