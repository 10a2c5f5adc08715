//! Chaos decision engine
//!
//! Resolves a strategy for each request and applies it to a response
//! producer: pass through, synthesize an error, stall then drop, or stall and
//! scramble the status code.

use std::future::Future;
use std::sync::Arc;

use domain::{ChaosResult, ChaosStrategy, ResponseEnvelope};
use tracing::{debug, error, info, instrument, warn};

use super::chaos_config::{ChaosConfig, DecisionMode};
use super::chaos_stats::{ChaosStats, ChaosStatsSnapshot};
use super::decision_policy::{self, DecisionPolicy};
use super::strategy_state::StrategyState;
use crate::error::{ApplicationError, ChaosError};
use crate::ports::DelayPort;

/// Engine that owns the active strategy and applies chaos to requests
pub struct ChaosService {
    config: ChaosConfig,
    policy: DecisionPolicy,
    state: StrategyState,
    delay: Arc<dyn DelayPort>,
    stats: ChaosStats,
}

impl std::fmt::Debug for ChaosService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaosService")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("delay", &"<DelayPort>")
            .finish_non_exhaustive()
    }
}

impl ChaosService {
    /// Create the engine from a configuration snapshot
    ///
    /// The active strategy starts as `config.initial_strategy`, or `NoChaos`.
    pub fn new(config: ChaosConfig, delay: Arc<dyn DelayPort>) -> Result<Self, ApplicationError> {
        let policy = DecisionPolicy::from_config(&config)?;
        let initial = config.starting_strategy();
        info!(
            strategy = %initial,
            decision_mode = %policy.mode(),
            triggers = ?policy.triggers().patterns(),
            "Initial active chaos strategy: {initial}"
        );
        Ok(Self {
            config,
            policy,
            state: StrategyState::new(initial),
            delay,
            stats: ChaosStats::new(),
        })
    }

    /// Configuration snapshot the engine was built with
    pub const fn config(&self) -> &ChaosConfig {
        &self.config
    }

    /// Whether callers should attach diagnostic headers
    pub const fn tracing_headers(&self) -> bool {
        self.config.tracing_headers
    }

    /// Per-request resolution mode
    pub const fn decision_mode(&self) -> DecisionMode {
        self.policy.mode()
    }

    /// Currently active strategy
    pub fn active_strategy(&self) -> ChaosStrategy {
        self.state.get()
    }

    /// Replace the active strategy, returning the previous one
    pub fn set_active_strategy(&self, strategy: ChaosStrategy) -> ChaosStrategy {
        self.state.set(strategy)
    }

    /// Copy of the chaos counters
    pub fn stats(&self) -> ChaosStatsSnapshot {
        self.stats.snapshot()
    }

    /// Whether the URI matches the trigger set
    pub fn should_be_chaotic(&self, uri: &str) -> bool {
        self.policy.should_be_chaotic(uri)
    }

    /// Strategy that applies to a request for `uri`
    pub fn resolve_strategy(&self, uri: &str) -> ChaosStrategy {
        self.policy
            .resolve(uri, self.active_strategy(), &mut rand::rng())
    }

    /// Resolve a strategy for `uri` and apply it to `producer`
    ///
    /// `producer` is called at most once, and only when the strategy needs
    /// the real response.
    #[instrument(skip(self, producer))]
    pub async fn process_request<F, Fut>(
        &self,
        uri: &str,
        producer: F,
    ) -> Result<ChaosResult, ChaosError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<ResponseEnvelope, ApplicationError>> + Send,
    {
        let strategy = self.resolve_strategy(uri);
        info!(%strategy, "Chaos: {strategy}");
        self.apply_strategy(strategy, producer).await
    }

    /// Apply a specific strategy to `producer`
    ///
    /// | Strategy | Producer | Outcome |
    /// |---|---|---|
    /// | `NoChaos` | once | producer's response |
    /// | `InternalServerError` / `BadRequest` | never | synthesized 500 / 400 |
    /// | `DelayRequest` | never | delay, then `Dropped` |
    /// | `InstantRequestDelayResponse` | once | delay, then `Dropped` |
    /// | `RandomHavoc` | once | random delay, random status |
    pub async fn apply_strategy<F, Fut>(
        &self,
        strategy: ChaosStrategy,
        producer: F,
    ) -> Result<ChaosResult, ChaosError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<ResponseEnvelope, ApplicationError>> + Send,
    {
        self.stats.record_resolution(strategy);

        match strategy {
            ChaosStrategy::NoChaos => {
                let response = self.invoke(strategy, producer).await?;
                Ok(ChaosResult::passthrough(response))
            },
            ChaosStrategy::InternalServerError | ChaosStrategy::BadRequest => {
                let status = strategy.synthesized_status().ok_or_else(|| {
                    error!(%strategy, "Unsupported chaos strategy");
                    ChaosError::Configuration(format!("Unsupported chaos strategy: {strategy}"))
                })?;
                Ok(ChaosResult::synthesized(strategy, status))
            },
            ChaosStrategy::DelayRequest => {
                let delayed_by_secs = self.delay_request_based_on_configuration(strategy).await?;
                Err(self.drop_request(strategy, delayed_by_secs))
            },
            ChaosStrategy::InstantRequestDelayResponse => {
                let response = self.invoke(strategy, producer).await?;
                let delayed_by_secs = self.delay_request_based_on_configuration(strategy).await?;
                debug!(status = response.status, "Discarding fetched upstream response");
                Err(self.drop_request(strategy, delayed_by_secs))
            },
            ChaosStrategy::RandomHavoc => {
                let delayed_by_secs = self.randomly_delay_request(strategy).await?;
                let response = self.invoke(strategy, producer).await?;
                let status_code = draw_havoc_status();
                let result = ChaosResult::havoc(response, status_code, delayed_by_secs);
                info!(
                    status_code,
                    substituted = result.status_substituted(),
                    "Responding with status code: {status_code}"
                );
                Ok(result)
            },
        }
    }

    async fn invoke<F, Fut>(
        &self,
        strategy: ChaosStrategy,
        producer: F,
    ) -> Result<ResponseEnvelope, ChaosError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<ResponseEnvelope, ApplicationError>> + Send,
    {
        debug_assert!(strategy.invokes_producer(), "{strategy} never calls upstream");
        self.stats.record_producer_invocation();
        producer().await.map_err(|e| {
            self.stats.record_upstream_failure();
            ChaosError::Upstream(e)
        })
    }

    async fn delay_request_based_on_configuration(
        &self,
        strategy: ChaosStrategy,
    ) -> Result<u64, ChaosError> {
        if self.config.fixed_delay_period {
            let seconds = self.config.delay_time_seconds;
            info!(seconds, "Delaying response by {seconds} seconds");
            self.sleep(strategy, seconds).await?;
            Ok(seconds)
        } else {
            self.randomly_delay_request(strategy).await
        }
    }

    async fn randomly_delay_request(&self, strategy: ChaosStrategy) -> Result<u64, ChaosError> {
        let seconds = self.draw_random_delay();
        if seconds > 0 {
            info!(seconds, "Delaying response by {seconds} seconds");
            self.sleep(strategy, seconds).await?;
        }
        Ok(seconds)
    }

    async fn sleep(&self, strategy: ChaosStrategy, seconds: u64) -> Result<(), ChaosError> {
        if seconds == 0 {
            return Ok(());
        }
        match self.delay.delay(seconds).await {
            Ok(()) => {
                self.stats.record_delay(seconds);
                Ok(())
            },
            Err(e) => {
                self.stats.record_interrupted();
                warn!(%strategy, error = %e, "Chaos delay interrupted");
                Err(ChaosError::Interrupted { strategy })
            },
        }
    }

    fn drop_request(&self, strategy: ChaosStrategy, delayed_by_secs: u64) -> ChaosError {
        debug_assert!(strategy.drops_request(), "{strategy} completes requests");
        self.stats.record_dropped();
        info!(%strategy, delayed_by_secs, "Dropping request");
        ChaosError::Dropped {
            strategy,
            delayed_by_secs,
        }
    }

    fn draw_random_delay(&self) -> u64 {
        decision_policy::random_delay_seconds(&mut rand::rng(), self.config.random_delay_max_seconds)
    }
}

fn draw_havoc_status() -> u16 {
    decision_policy::random_status_code_favouring_ok(&mut rand::rng())
}
