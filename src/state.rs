use crate::{services::chat::registry::SessionRegistry, Config};
use std::sync::Arc;

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Registry owning one actor per session identifier
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Create a new AppState instance
    ///
    /// # Arguments
    /// * `config` - Loaded configuration
    /// * `sessions` - Session actor registry
    pub fn new(config: Config, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            config: Arc::new(config),
            sessions,
        }
    }
}
