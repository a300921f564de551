//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use mathquest_core::config::AppConfig;
use mathquest_database::DirectoryStore;
use mathquest_realtime::RealtimeGateway;

/// Application state passed to every Axum handler via `State<AppState>`.
///
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// WebSocket realtime gateway.
    pub gateway: Arc<RealtimeGateway>,
    /// Directory store, for health reporting.
    pub directory: Arc<dyn DirectoryStore>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Assemble state from already-built components.
    pub fn new(
        config: AppConfig,
        gateway: Arc<RealtimeGateway>,
        directory: Arc<dyn DirectoryStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            directory,
            started_at: Instant::now(),
        }
    }
}
