//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// Text did not name any known chaos strategy
    #[error("Unsupported chaos strategy: {0}")]
    UnsupportedStrategy(String),

    /// Number outside the range of HTTP status codes
    #[error("Invalid HTTP status code: {0}")]
    InvalidStatusCode(u16),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create an unsupported strategy error
    pub fn unsupported_strategy(value: impl Into<String>) -> Self {
        Self::UnsupportedStrategy(value.into())
    }
}
