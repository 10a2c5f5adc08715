//! Chaos result entity

use serde::{Deserialize, Serialize};

use super::ResponseEnvelope;
use crate::value_objects::ChaosStrategy;

/// Outcome of one request's chaos processing
///
/// Built fresh per request and owned by the caller once returned.
/// `delayed_by_secs` is nonzero only when a delay was actually performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosResult {
    /// Strategy that was applied to the request
    pub strategy: ChaosStrategy,
    /// Status code to answer with; may differ from `response.status`
    pub status_code: u16,
    /// Real or synthesized response payload
    pub response: ResponseEnvelope,
    /// Seconds slept before answering
    pub delayed_by_secs: u64,
}

impl ChaosResult {
    /// Pass a real response through unchanged
    #[must_use]
    pub const fn passthrough(response: ResponseEnvelope) -> Self {
        Self {
            strategy: ChaosStrategy::NoChaos,
            status_code: response.status,
            response,
            delayed_by_secs: 0,
        }
    }

    /// Synthesize an error answer without any upstream response
    #[must_use]
    pub const fn synthesized(strategy: ChaosStrategy, status_code: u16) -> Self {
        Self {
            strategy,
            status_code,
            response: ResponseEnvelope::empty(status_code),
            delayed_by_secs: 0,
        }
    }

    /// Keep the real payload but substitute the status code
    #[must_use]
    pub const fn havoc(response: ResponseEnvelope, status_code: u16, delayed_by_secs: u64) -> Self {
        Self {
            strategy: ChaosStrategy::RandomHavoc,
            status_code,
            response,
            delayed_by_secs,
        }
    }

    /// Whether the answered status differs from the upstream one
    #[must_use]
    pub const fn status_substituted(&self) -> bool {
        self.status_code != self.response.status
    }
}
