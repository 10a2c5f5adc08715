//! Application services - chaos engine and its collaborators

mod chaos_config;
mod chaos_service;
mod chaos_stats;
pub mod decision_policy;
mod strategy_state;

pub use chaos_config::{ChaosConfig, DEFAULT_TRIGGER_PATH, DecisionMode};
pub use chaos_service::ChaosService;
pub use chaos_stats::{ChaosStats, ChaosStatsSnapshot};
pub use decision_policy::{DecisionPolicy, TriggerSet};
pub use strategy_state::StrategyState;
