use std::sync::Arc;

use partreg_core::RegistryService;

/// Shared handler state. The service is already internally synchronized,
/// so the state is a single `Arc` cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistryService>,
}

impl AppState {
    pub fn new(registry: RegistryService) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
