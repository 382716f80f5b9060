pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::Gateway;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Fresh, empty chat state. Nothing survives a restart.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            gateway: Arc::new(Gateway::new()),
        }
    }
}
