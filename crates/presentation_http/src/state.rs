//! Application state shared across handlers

use std::sync::Arc;

use application::{ChaosService, UpstreamPort};
use infrastructure::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Chaos engine holding the active strategy
    pub chaos: Arc<ChaosService>,
    /// Where non-admin requests are forwarded
    pub upstream: Arc<dyn UpstreamPort>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Bundle the shared components
    pub fn new(
        chaos: Arc<ChaosService>,
        upstream: Arc<dyn UpstreamPort>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            chaos,
            upstream,
            config,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("active_strategy", &self.chaos.active_strategy())
            .field("upstream", &self.upstream.base_url())
            .finish_non_exhaustive()
    }
}
