//! Proxy configuration
//!
//! Split into focused sub-modules:
//! - `server`: listener, logging and body limits
//! - `upstream`: the real service behind the proxy
//!
//! The `[chaos]` section deserializes straight into the application-layer
//! [`ChaosConfig`].

mod server;
mod upstream;

use application::ChaosConfig;
use serde::{Deserialize, Serialize};

use crate::validation::{ConfigValidator, ConfigWarning};

pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

/// Environment variable prefix, e.g. `CHAOS_PROXY__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "CHAOS_PROXY";

/// Separator between prefix and nested keys in environment variables
pub const ENV_SEPARATOR: &str = "__";

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream service
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Chaos engine parameters
    #[serde(default)]
    pub chaos: ChaosConfig,
}

impl AppConfig {
    /// Load configuration from environment and optional `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = Self::defaults()?
            // Load from file if exists
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables (e.g., CHAOS_PROXY__CHAOS__DELAY_TIME_SECONDS)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("chaos.trigger_paths")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a TOML document layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let server = ServerConfig::default();
        let upstream = UpstreamConfig::default();
        config::Config::builder()
            .set_default("server.host", server.host)?
            .set_default("server.port", i64::from(server.port))?
            .set_default("upstream.base_url", upstream.base_url)
    }

    /// Check the configuration for suspicious settings
    ///
    /// Never fails; the caller decides how loudly to report the warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        ConfigValidator::validate(self)
    }
}
