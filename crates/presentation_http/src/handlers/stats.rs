//! Chaos statistics handler

use application::ChaosStatsSnapshot;
use axum::{Json, extract::State};

use crate::state::AppState;

/// Current chaos counters
pub async fn get_stats(State(state): State<AppState>) -> Json<ChaosStatsSnapshot> {
    Json(state.chaos.stats())
}
