//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use plughost_cache::CacheManager;
use plughost_core::config::AppConfig;
use plughost_plugin::PluginManager;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Cache manager (Redis or in-memory)
    pub cache: CacheManager,
    /// Booted plugin system
    pub plugins: Arc<PluginManager>,
    /// Process start, for the health endpoint
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: AppConfig, cache: CacheManager, plugins: Arc<PluginManager>) -> Self {
        Self {
            config: Arc::new(config),
            cache,
            plugins,
            started_at: Instant::now(),
        }
    }
}
