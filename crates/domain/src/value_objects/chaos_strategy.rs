//! Chaos strategy value object
//!
//! A named treatment applied to a proxied request to simulate a failure
//! condition. Exactly one strategy is active process-wide at any time.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::status_code;
use crate::errors::DomainError;

/// Chaos treatment applied to a request
///
/// The textual form is `SCREAMING_SNAKE_CASE` (`NO_CHAOS`, `DELAY_REQUEST`, ...),
/// used for serialization, display and the runtime strategy file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ChaosStrategy {
    /// Pass the upstream response through untouched
    #[default]
    NoChaos = 0,
    /// Answer with a synthesized 500 without calling upstream
    InternalServerError = 1,
    /// Answer with a synthesized 400 without calling upstream
    BadRequest = 2,
    /// Sleep, then drop the request without calling upstream
    DelayRequest = 3,
    /// Call upstream, sleep, then drop the already-fetched response
    InstantRequestDelayResponse = 4,
    /// Random delay plus a random status code favouring 200
    RandomHavoc = 5,
}

impl ChaosStrategy {
    /// Every strategy, in declaration order
    pub const ALL: [Self; 6] = [
        Self::NoChaos,
        Self::InternalServerError,
        Self::BadRequest,
        Self::DelayRequest,
        Self::InstantRequestDelayResponse,
        Self::RandomHavoc,
    ];

    /// Canonical name of the strategy
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoChaos => "NO_CHAOS",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::DelayRequest => "DELAY_REQUEST",
            Self::InstantRequestDelayResponse => "INSTANT_REQUEST_DELAY_RESPONSE",
            Self::RandomHavoc => "RANDOM_HAVOC",
        }
    }

    /// Discriminant used for atomic storage
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`ChaosStrategy::as_u8`]
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::NoChaos),
            1 => Some(Self::InternalServerError),
            2 => Some(Self::BadRequest),
            3 => Some(Self::DelayRequest),
            4 => Some(Self::InstantRequestDelayResponse),
            5 => Some(Self::RandomHavoc),
            _ => None,
        }
    }

    /// Whether applying this strategy calls the upstream response producer
    #[must_use]
    pub const fn invokes_producer(&self) -> bool {
        matches!(
            self,
            Self::NoChaos | Self::InstantRequestDelayResponse | Self::RandomHavoc
        )
    }

    /// Whether this strategy abandons the request after its delay
    #[must_use]
    pub const fn drops_request(&self) -> bool {
        matches!(self, Self::DelayRequest | Self::InstantRequestDelayResponse)
    }

    /// Status code synthesized without calling upstream, if any
    #[must_use]
    pub const fn synthesized_status(&self) -> Option<u16> {
        match self {
            Self::InternalServerError => Some(status_code::INTERNAL_SERVER_ERROR),
            Self::BadRequest => Some(status_code::BAD_REQUEST),
            _ => None,
        }
    }
}

impl fmt::Display for ChaosStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uppercase with separators removed, so `delay-request`, `DelayRequest`
/// and `DELAY_REQUEST` compare equal.
fn normalize(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_uppercase)
        .collect()
}

impl std::str::FromStr for ChaosStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return Err(DomainError::unsupported_strategy(s));
        }
        Self::ALL
            .into_iter()
            .find(|strategy| normalize(strategy.as_str()) == wanted)
            .ok_or_else(|| DomainError::unsupported_strategy(s))
    }
}
