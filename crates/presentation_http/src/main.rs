//! Chaos proxy server
//!
//! Main entry point for the fault-injecting reverse proxy.

use std::{future::IntoFuture, sync::Arc, time::Duration};

use application::{ChaosService, DelayPort, UpstreamPort};
use infrastructure::{
    AppConfig, LoggingSettings, ReqwestUpstreamAdapter, RuntimeStrategyFile, TokioDelayAdapter,
    init_logging,
};
use presentation_http::{routes, spawn_strategy_reload_handler, state::AppState};
use tokio::{net::TcpListener, signal, sync::watch};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before logging so the log format can be honoured
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&LoggingSettings::from_server(&config.server))?;

    info!("Chaos proxy v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }
    for warning in config.validate() {
        warn!(code = warning.code, "{warning}");
    }

    info!(
        host = %config.server.host,
        port = %config.server.port,
        upstream = %config.upstream.base_url,
        decision_mode = %config.chaos.decision_mode,
        "Configuration loaded"
    );

    // Flipped to true on shutdown to interrupt in-flight chaos delays
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut shutdown_started = shutdown_tx.subscribe();

    let delay: Arc<dyn DelayPort> = Arc::new(TokioDelayAdapter::new(shutdown_rx));
    let chaos = Arc::new(ChaosService::new(config.chaos.clone(), delay)?);
    let upstream: Arc<dyn UpstreamPort> = Arc::new(
        ReqwestUpstreamAdapter::new(&config.upstream)?
            .with_max_body_size(config.server.max_body_size_bytes),
    );

    if let Some(path) = &config.chaos.runtime_strategy_file {
        spawn_strategy_reload_handler(Arc::clone(&chaos), RuntimeStrategyFile::new(path));
    }

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);
    let addr = config.server.bind_address();
    let state = AppState::new(chaos, upstream, Arc::new(config));

    let app = routes::create_router(state).layer(TraceLayer::new_for_http());
    let listener = TcpListener::bind(&addr).await?;

    info!("Proxy listening on http://{}", addr);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .into_future();
    let drain_deadline = async {
        if shutdown_started.wait_for(|stop| *stop).await.is_ok() {
            tokio::time::sleep(shutdown_timeout).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => result?,
        () = drain_deadline => {
            warn!("Connections still open after {:?}, exiting", shutdown_timeout);
        }
    }

    info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM), then interrupt pending delays
async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    let ctrl_c = async {
        // Log error but continue waiting - this is a best-effort signal handler
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown.send_replace(true);
    info!("Interrupted pending chaos delays, draining connections");
}
