//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports with tokio timers and a reqwest client,
//! and provides configuration loading, startup validation, logging and the
//! runtime strategy file.

pub mod adapters;
pub mod config;
pub mod runtime_strategy;
pub mod telemetry;
pub mod validation;

pub use adapters::*;
pub use config::{AppConfig, ServerConfig, UpstreamConfig};
pub use runtime_strategy::RuntimeStrategyFile;
pub use telemetry::{LogFormat, LoggingSettings, TelemetryError, init_logging};
pub use validation::{ConfigValidator, ConfigWarning, WarningSeverity};
