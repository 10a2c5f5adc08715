//! Route definitions

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, handler::Handler, routing::get};
use tower::ServiceBuilder;

use crate::{handlers, middleware::ChaosLayer, state::AppState};

/// Create the main router with all routes
///
/// Admin routes live under `/chaos` plus `/health`; every other request falls
/// through to the proxy, wrapped in the chaos middleware.
pub fn create_router(state: AppState) -> Router {
    let max_body_size = state.config.server.max_body_size_bytes;

    let proxy = ServiceBuilder::new()
        .layer(ChaosLayer::new(Arc::clone(&state.chaos), max_body_size))
        .service(handlers::proxy::proxy.with_state(state.clone()));

    Router::new()
        // Health endpoint
        .route("/health", get(handlers::health::health_check))
        // Chaos administration
        .route(
            "/chaos/strategy",
            get(handlers::strategy::get_strategy).put(handlers::strategy::set_strategy),
        )
        .route("/chaos/strategies", get(handlers::strategy::list_strategies))
        .route("/chaos/stats", get(handlers::stats::get_stats))
        // Everything else is proxied
        .fallback_service(proxy)
        .layer(DefaultBodyLimit::max(max_body_size))
        // Attach state
        .with_state(state)
}
