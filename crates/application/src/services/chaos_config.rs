//! Chaos configuration snapshot
//!
//! Loaded once at startup and read-only afterwards, so it is shared behind an
//! `Arc` without synchronization.

use std::fmt;
use std::path::PathBuf;

use domain::ChaosStrategy;
use serde::{Deserialize, Serialize};

/// Path fragment marking requests eligible for chaos by default
pub const DEFAULT_TRIGGER_PATH: &str = "/commitTransaction";

/// How the per-request strategy is resolved for eligible URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Coin flips between no chaos and the two delay variants; the active
    /// strategy is not consulted
    #[default]
    Legacy,
    /// Eligible URIs get the active strategy
    RespectActive,
}

impl fmt::Display for DecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::RespectActive => write!(f, "respect_active"),
        }
    }
}

impl std::str::FromStr for DecisionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "legacy" => Ok(Self::Legacy),
            "respect_active" | "active" => Ok(Self::RespectActive),
            _ => Err(format!(
                "Invalid decision mode: {s}. Use 'legacy' or 'respect_active'"
            )),
        }
    }
}

/// Chaos parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosConfig {
    /// Strategy active at startup (defaults to no chaos)
    #[serde(default)]
    pub initial_strategy: Option<ChaosStrategy>,

    /// Sleep exactly `delay_time_seconds` instead of a random delay
    #[serde(default)]
    pub fixed_delay_period: bool,

    /// Fixed delay in seconds
    #[serde(default = "default_delay_time_seconds")]
    pub delay_time_seconds: u64,

    /// Exclusive upper bound for random delays in seconds
    #[serde(default = "default_random_delay_max_seconds")]
    pub random_delay_max_seconds: u64,

    /// Attach diagnostic headers to completed responses
    #[serde(default)]
    pub tracing_headers: bool,

    /// URI substrings that make a request eligible for chaos
    #[serde(default = "default_trigger_paths")]
    pub trigger_paths: Vec<String>,

    /// Per-request resolution mode
    #[serde(default)]
    pub decision_mode: DecisionMode,

    /// File whose first line names a strategy, applied on SIGHUP
    #[serde(default)]
    pub runtime_strategy_file: Option<PathBuf>,
}

const fn default_delay_time_seconds() -> u64 {
    5
}

const fn default_random_delay_max_seconds() -> u64 {
    10
}

fn default_trigger_paths() -> Vec<String> {
    vec![DEFAULT_TRIGGER_PATH.to_string()]
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            initial_strategy: None,
            fixed_delay_period: false,
            delay_time_seconds: default_delay_time_seconds(),
            random_delay_max_seconds: default_random_delay_max_seconds(),
            tracing_headers: false,
            trigger_paths: default_trigger_paths(),
            decision_mode: DecisionMode::default(),
            runtime_strategy_file: None,
        }
    }
}

impl ChaosConfig {
    /// Strategy the engine starts with
    #[must_use]
    pub fn starting_strategy(&self) -> ChaosStrategy {
        self.initial_strategy.unwrap_or_default()
    }

    /// Set the initial strategy
    #[must_use]
    pub const fn with_initial_strategy(mut self, strategy: ChaosStrategy) -> Self {
        self.initial_strategy = Some(strategy);
        self
    }

    /// Use a fixed delay of `seconds`
    #[must_use]
    pub const fn with_fixed_delay(mut self, seconds: u64) -> Self {
        self.fixed_delay_period = true;
        self.delay_time_seconds = seconds;
        self
    }

    /// Use random delays below `max_seconds`
    #[must_use]
    pub const fn with_random_delay(mut self, max_seconds: u64) -> Self {
        self.fixed_delay_period = false;
        self.random_delay_max_seconds = max_seconds;
        self
    }

    /// Set the trigger substrings
    #[must_use]
    pub fn with_trigger_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trigger_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the decision mode
    #[must_use]
    pub const fn with_decision_mode(mut self, mode: DecisionMode) -> Self {
        self.decision_mode = mode;
        self
    }

    /// Enable or disable tracing headers
    #[must_use]
    pub const fn with_tracing_headers(mut self, enabled: bool) -> Self {
        self.tracing_headers = enabled;
        self
    }
}
