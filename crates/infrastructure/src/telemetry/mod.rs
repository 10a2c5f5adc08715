//! Logging infrastructure
//!
//! Installs the global `tracing` subscriber used by the proxy binary.

mod logging;

pub use logging::{LogFormat, LoggingSettings, TelemetryError, init_logging};
