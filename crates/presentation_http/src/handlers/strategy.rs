//! Active strategy administration

use application::DecisionMode;
use axum::{Json, extract::State};
use domain::ChaosStrategy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Current chaos settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyResponse {
    pub strategy: ChaosStrategy,
    pub decision_mode: DecisionMode,
    pub tracing_headers: bool,
}

/// Body of a strategy change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStrategyRequest {
    /// Strategy name, matched loosely (`delay-request` works)
    pub strategy: String,
}

/// Result of a strategy change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStrategyResponse {
    pub previous: ChaosStrategy,
    pub strategy: ChaosStrategy,
}

/// Show the active strategy
pub async fn get_strategy(State(state): State<AppState>) -> Json<StrategyResponse> {
    Json(StrategyResponse {
        strategy: state.chaos.active_strategy(),
        decision_mode: state.chaos.decision_mode(),
        tracing_headers: state.chaos.tracing_headers(),
    })
}

/// Replace the active strategy
///
/// An unknown name is rejected with 400 and leaves the active strategy as is.
pub async fn set_strategy(
    State(state): State<AppState>,
    Json(request): Json<SetStrategyRequest>,
) -> Result<Json<SetStrategyResponse>, ApiError> {
    let strategy: ChaosStrategy = request.strategy.parse()?;
    let previous = state.chaos.set_active_strategy(strategy);
    debug!(%previous, %strategy, "Strategy set via admin API");

    Ok(Json(SetStrategyResponse { previous, strategy }))
}

/// List every strategy name
pub async fn list_strategies() -> Json<Vec<ChaosStrategy>> {
    Json(ChaosStrategy::ALL.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_contains_every_strategy() {
        let Json(all) = list_strategies().await;
        assert_eq!(all.len(), 6);
        assert_eq!(all[0], ChaosStrategy::NoChaos);
    }

    #[test]
    fn set_strategy_request_deserializes() {
        let req: SetStrategyRequest =
            serde_json::from_str(r#"{"strategy":"random-havoc"}"#).unwrap();
        assert_eq!(req.strategy.parse::<ChaosStrategy>(), Ok(ChaosStrategy::RandomHavoc));
    }

    #[test]
    fn strategy_response_serializes_canonical_names() {
        let resp = StrategyResponse {
            strategy: ChaosStrategy::DelayRequest,
            decision_mode: DecisionMode::Legacy,
            tracing_headers: true,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["strategy"], "DELAY_REQUEST");
        assert_eq!(json["decision_mode"], "legacy");
    }
}
