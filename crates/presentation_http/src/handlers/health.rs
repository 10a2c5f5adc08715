//! Liveness endpoint

use axum::{Json, extract::State};
use domain::ChaosStrategy;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Proxy liveness report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Upstream base URL the proxy forwards to
    pub upstream: String,
    pub active_strategy: ChaosStrategy,
}

/// Report that the proxy is up; does not contact the upstream
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        upstream: state.upstream.base_url(),
        active_strategy: state.chaos.active_strategy(),
    })
}
