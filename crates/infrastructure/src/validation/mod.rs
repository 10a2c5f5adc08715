//! Configuration validation module
//!
//! Provides startup checks that flag settings which make the proxy
//! misbehave without being outright invalid.

pub mod config_check;

pub use config_check::{ConfigValidator, ConfigWarning, WarningSeverity};
