//! Per-request chaos decision policy
//!
//! Every function here is synchronous and takes the random source as a
//! parameter. Callers draw before any `.await` so a thread-local generator is
//! never held across a suspension point, and tests can pass a seeded `StdRng`.

use aho_corasick::AhoCorasick;
use domain::{ChaosStrategy, VALID_STATUS_CODES, status_code};
use rand::Rng;

use super::chaos_config::{ChaosConfig, DecisionMode};
use crate::error::ApplicationError;

/// Probability that an eligible request becomes chaotic in legacy mode
pub const CHAOS_PROBABILITY: f64 = 0.5;

/// Share of chaotic requests that become `DelayRequest` rather than
/// `InstantRequestDelayResponse`
pub const DELAY_REQUEST_SHARE: f64 = 0.5;

/// Probability of the favoured outcome for delays and havoc status codes
pub const FAVOURED_PROBABILITY: f64 = 0.75;

/// Set of URI substrings that make a request eligible for chaos
#[derive(Debug, Clone)]
pub struct TriggerSet {
    patterns: Vec<String>,
    matcher: AhoCorasick,
}

impl TriggerSet {
    /// Build a matcher over the given substrings
    pub fn new<I, S>(patterns: I) -> Result<Self, ApplicationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let matcher = AhoCorasick::new(&patterns)
            .map_err(|e| ApplicationError::Configuration(format!("Invalid trigger paths: {e}")))?;
        Ok(Self { patterns, matcher })
    }

    /// Whether the URI contains any trigger substring
    pub fn matches(&self, uri: &str) -> bool {
        !self.patterns.is_empty() && self.matcher.is_match(uri)
    }

    /// Configured substrings
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

/// Coin that lands on the favoured side with probability 0.75
pub fn favoured_coin<R: Rng>(rng: &mut R) -> bool {
    rng.random::<f64>() <= FAVOURED_PROBABILITY
}

/// Seconds a random delay should last
///
/// Zero with probability 0.25, otherwise uniform in `[0, max_seconds)`.
/// An empty range (`max_seconds == 0`) yields zero.
pub fn random_delay_seconds<R: Rng>(rng: &mut R, max_seconds: u64) -> u64 {
    if !favoured_coin(rng) || max_seconds == 0 {
        return 0;
    }
    rng.random_range(0..max_seconds)
}

/// Status code for random havoc
///
/// 200 with probability 0.75, otherwise drawn from [`VALID_STATUS_CODES`].
/// The draw's upper bound is `len - 1`, so the last entry (505) is never
/// picked.
pub fn random_status_code_favouring_ok<R: Rng>(rng: &mut R) -> u16 {
    if favoured_coin(rng) {
        return status_code::OK;
    }
    let upper = VALID_STATUS_CODES.len() - 1;
    VALID_STATUS_CODES[rng.random_range(0..upper)]
}

/// Resolves which strategy applies to a single request
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    triggers: TriggerSet,
    mode: DecisionMode,
}

impl DecisionPolicy {
    /// Create a policy from a trigger set and mode
    pub const fn new(triggers: TriggerSet, mode: DecisionMode) -> Self {
        Self { triggers, mode }
    }

    /// Create a policy from configuration
    pub fn from_config(config: &ChaosConfig) -> Result<Self, ApplicationError> {
        Ok(Self::new(
            TriggerSet::new(config.trigger_paths.iter().cloned())?,
            config.decision_mode,
        ))
    }

    /// Resolution mode
    pub const fn mode(&self) -> DecisionMode {
        self.mode
    }

    /// Trigger set
    pub const fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    /// Whether the URI is eligible for chaos at all
    pub fn should_be_chaotic(&self, uri: &str) -> bool {
        self.triggers.matches(uri)
    }

    /// Strategy to apply to this request
    ///
    /// Ineligible URIs always resolve to `NoChaos`. In legacy mode an eligible
    /// URI turns chaotic on a fair coin and then picks one of the two delay
    /// variants on a second coin; `active` is ignored. In respect-active mode
    /// an eligible URI gets `active`.
    pub fn resolve<R: Rng>(
        &self,
        uri: &str,
        active: ChaosStrategy,
        rng: &mut R,
    ) -> ChaosStrategy {
        match self.mode {
            DecisionMode::Legacy => {
                let gate = rng.random::<f64>() < CHAOS_PROBABILITY;
                if !(gate && self.should_be_chaotic(uri)) {
                    return ChaosStrategy::NoChaos;
                }
                if rng.random::<f64>() < DELAY_REQUEST_SHARE {
                    ChaosStrategy::DelayRequest
                } else {
                    ChaosStrategy::InstantRequestDelayResponse
                }
            },
            DecisionMode::RespectActive => {
                if self.should_be_chaotic(uri) {
                    active
                } else {
                    ChaosStrategy::NoChaos
                }
            },
        }
    }
}
