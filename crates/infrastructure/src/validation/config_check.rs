//! Startup checks for proxy configuration
//!
//! Flags settings that are accepted but almost certainly not what the
//! operator meant, such as a trigger set that can never match.

use std::fmt;

use crate::config::AppConfig;

/// Severity level for configuration warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningSeverity {
    /// Informational - no action required
    Info,
    /// Warning - the proxy runs but likely not as intended
    Warning,
}

impl fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// A configuration warning with severity and description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Severity level of the warning
    pub severity: WarningSeverity,
    /// Short code identifying the warning type
    pub code: &'static str,
    /// Human-readable description of the issue
    pub message: String,
    /// Recommended action to resolve the issue
    pub recommendation: &'static str,
}

impl ConfigWarning {
    fn warning(code: &'static str, message: impl Into<String>, recommendation: &'static str) -> Self {
        Self {
            severity: WarningSeverity::Warning,
            code,
            message: message.into(),
            recommendation,
        }
    }

    fn info(code: &'static str, message: impl Into<String>, recommendation: &'static str) -> Self {
        Self {
            severity: WarningSeverity::Info,
            code,
            message: message.into(),
            recommendation,
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} - {}",
            self.severity, self.code, self.message, self.recommendation
        )
    }
}

/// Validates proxy configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration and return all warnings
    pub fn validate(config: &AppConfig) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        Self::check_delays(config, &mut warnings);
        Self::check_triggers(config, &mut warnings);
        Self::check_upstream(config, &mut warnings);
        warnings
    }

    fn check_delays(config: &AppConfig, warnings: &mut Vec<ConfigWarning>) {
        let chaos = &config.chaos;
        if !chaos.fixed_delay_period && chaos.random_delay_max_seconds == 0 {
            warnings.push(ConfigWarning::warning(
                "ZERO_RANDOM_DELAY",
                "random_delay_max_seconds is 0, random delays never sleep",
                "Set random_delay_max_seconds above 0 or enable fixed_delay_period",
            ));
        }
        if chaos.fixed_delay_period && chaos.delay_time_seconds == 0 {
            warnings.push(ConfigWarning::info(
                "ZERO_FIXED_DELAY",
                "delay_time_seconds is 0, delayed requests are dropped immediately",
                "Set delay_time_seconds above 0 to simulate slow responses",
            ));
        }
    }

    fn check_triggers(config: &AppConfig, warnings: &mut Vec<ConfigWarning>) {
        if config.chaos.trigger_paths.is_empty() {
            warnings.push(ConfigWarning::warning(
                "EMPTY_TRIGGER_SET",
                "No trigger paths configured, no request is eligible for chaos",
                "Add at least one entry to chaos.trigger_paths",
            ));
        } else if config.chaos.trigger_paths.iter().any(String::is_empty) {
            warnings.push(ConfigWarning::warning(
                "EMPTY_TRIGGER_PATH",
                "An empty trigger path matches every request",
                "Remove empty entries from chaos.trigger_paths",
            ));
        }
    }

    fn check_upstream(config: &AppConfig, warnings: &mut Vec<ConfigWarning>) {
        let url = config.upstream.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(ConfigWarning::warning(
                "UPSTREAM_SCHEME",
                format!("Upstream base URL '{url}' has no http(s) scheme"),
                "Use a full URL such as http://127.0.0.1:8081",
            ));
        }
    }
}
