//! Chaos statistics

use std::sync::atomic::{AtomicU64, Ordering};

use domain::ChaosStrategy;
use serde::{Deserialize, Serialize};

/// Point-in-time copy of the chaos counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosStatsSnapshot {
    /// Requests that went through the engine
    pub total_requests: u64,
    /// Requests resolved to each strategy
    pub no_chaos: u64,
    pub internal_server_error: u64,
    pub bad_request: u64,
    pub delay_request: u64,
    pub instant_request_delay_response: u64,
    pub random_havoc: u64,
    /// Times the response producer was called
    pub producer_invocations: u64,
    /// Requests abandoned after their delay
    pub requests_dropped: u64,
    /// Delays cut short
    pub delays_interrupted: u64,
    /// Producer failures passed through to the caller
    pub upstream_failures: u64,
    /// Sum of all completed delays in seconds
    pub total_delay_secs: u64,
}

impl ChaosStatsSnapshot {
    /// Share of requests that got any chaos treatment
    #[allow(clippy::cast_precision_loss)]
    pub fn chaos_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.total_requests - self.no_chaos) as f64 / self.total_requests as f64
        }
    }
}

/// Lock-free counters updated by concurrent request tasks
#[derive(Debug, Default)]
pub struct ChaosStats {
    total_requests: AtomicU64,
    per_strategy: [AtomicU64; 6],
    producer_invocations: AtomicU64,
    requests_dropped: AtomicU64,
    delays_interrupted: AtomicU64,
    upstream_failures: AtomicU64,
    total_delay_secs: AtomicU64,
}

impl ChaosStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request and the strategy it resolved to
    pub fn record_resolution(&self, strategy: ChaosStrategy) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.per_strategy[usize::from(strategy.as_u8())].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_producer_invocation(&self) {
        self.producer_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delay(&self, seconds: u64) {
        self.total_delay_secs.fetch_add(seconds, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.requests_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interrupted(&self) {
        self.delays_interrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> ChaosStatsSnapshot {
        let count = |strategy: ChaosStrategy| {
            self.per_strategy[usize::from(strategy.as_u8())].load(Ordering::Relaxed)
        };
        ChaosStatsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            no_chaos: count(ChaosStrategy::NoChaos),
            internal_server_error: count(ChaosStrategy::InternalServerError),
            bad_request: count(ChaosStrategy::BadRequest),
            delay_request: count(ChaosStrategy::DelayRequest),
            instant_request_delay_response: count(ChaosStrategy::InstantRequestDelayResponse),
            random_havoc: count(ChaosStrategy::RandomHavoc),
            producer_invocations: self.producer_invocations.load(Ordering::Relaxed),
            requests_dropped: self.requests_dropped.load(Ordering::Relaxed),
            delays_interrupted: self.delays_interrupted.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            total_delay_secs: self.total_delay_secs.load(Ordering::Relaxed),
        }
    }
}
