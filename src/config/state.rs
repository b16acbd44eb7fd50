// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::handler::Assistant;

/// Application state
pub struct AppState {
    pub config: Config,
    pub assistant: Assistant,

    /// Notified once when the server should stop accepting connections
    pub shutdown_signal: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            assistant: Assistant::from_config(&config.assistant),
            shutdown_signal: Arc::new(Notify::new()),
        }
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
