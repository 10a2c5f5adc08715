//! Runtime strategy reload
//!
//! Provides SIGHUP signal handling that re-reads the runtime strategy file
//! and applies it without a restart.

use std::sync::Arc;

use application::ChaosService;
use infrastructure::RuntimeStrategyFile;
use tracing::{debug, error, info};

/// Apply the strategy named in `file`
///
/// Returns `true` if a strategy was applied. A missing file or an unknown
/// name keeps the current strategy.
pub async fn reload_strategy(chaos: &ChaosService, file: &RuntimeStrategyFile) -> bool {
    match file.load().await {
        Ok(Some(strategy)) => {
            let previous = chaos.set_active_strategy(strategy);
            debug!(%previous, %strategy, path = %file.path().display(), "Runtime strategy applied");
            true
        },
        Ok(None) => false,
        Err(e) => {
            error!(path = %file.path().display(), error = %e, "Failed to reload runtime strategy");
            false
        },
    }
}

/// Spawn a background task that listens for SIGHUP and reloads the strategy
#[cfg(unix)]
pub fn spawn_strategy_reload_handler(chaos: Arc<ChaosService>, file: RuntimeStrategyFile) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                error!("Failed to install SIGHUP handler: {}", e);
                return;
            },
        };

        info!(path = %file.path().display(), "SIGHUP strategy reload enabled");
        while sighup.recv().await.is_some() {
            info!("Received SIGHUP, reloading runtime strategy");
            reload_strategy(&chaos, &file).await;
        }
    });
}

/// No-op on non-Unix systems
#[cfg(not(unix))]
pub fn spawn_strategy_reload_handler(_chaos: Arc<ChaosService>, _file: RuntimeStrategyFile) {
    tracing::warn!("SIGHUP strategy reload not supported on this platform");
}
