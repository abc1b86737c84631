/// Shared application state
use im_core::IdentityManager;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<dyn IdentityManager>,
}

impl AppState {
    pub fn new(manager: Arc<dyn IdentityManager>) -> Self {
        Self { manager }
    }
}
