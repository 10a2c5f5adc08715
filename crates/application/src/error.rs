//! Application-level errors

use domain::{ChaosStrategy, DomainError};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Upstream service or transport error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// A suspending operation was interrupted before it completed
    #[error("Interrupted: {0}")]
    Interrupted(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error stems from an interruption
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }
}

/// Outcome of a request the chaos engine did not complete normally
///
/// `Dropped` and `Interrupted` are cancellations: the intended chaos effect
/// or a shutdown, never an engine failure. Callers tell them apart from
/// genuine errors with [`ChaosError::is_cancellation`].
#[derive(Debug, Error)]
pub enum ChaosError {
    /// The request was deliberately abandoned after its delay
    #[error("Request dropped by {strategy} after {delayed_by_secs}s")]
    Dropped {
        strategy: ChaosStrategy,
        delayed_by_secs: u64,
    },

    /// The delay was cut short, e.g. by shutdown
    #[error("Chaos delay interrupted during {strategy}")]
    Interrupted { strategy: ChaosStrategy },

    /// The response producer failed; carried unmodified
    #[error(transparent)]
    Upstream(ApplicationError),

    /// Strategy could not be applied; fatal to the request
    #[error("Chaos configuration error: {0}")]
    Configuration(String),
}

impl ChaosError {
    /// Whether the request was cancelled rather than failed
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Dropped { .. } | Self::Interrupted { .. })
    }

    /// Seconds slept before the request was dropped
    pub const fn delayed_by_secs(&self) -> u64 {
        match self {
            Self::Dropped {
                delayed_by_secs, ..
            } => *delayed_by_secs,
            _ => 0,
        }
    }
}
