//! Delay adapter - Implements DelayPort with tokio timers
//!
//! A pending delay races the shutdown channel, so flipping it to `true`
//! interrupts every in-flight delay at once.

use std::time::Duration;

use application::error::ApplicationError;
use application::ports::DelayPort;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::debug;

/// Interruptible sleep backed by `tokio::time`
#[derive(Debug, Clone)]
pub struct TokioDelayAdapter {
    shutdown: watch::Receiver<bool>,
    tick: Duration,
}

impl TokioDelayAdapter {
    /// Create an adapter that stops sleeping once `shutdown` turns `true`
    pub const fn new(shutdown: watch::Receiver<bool>) -> Self {
        Self {
            shutdown,
            tick: Duration::from_secs(1),
        }
    }

    /// Length of one "second" of delay
    ///
    /// Lets tests run real timers at millisecond scale.
    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    fn duration_for(&self, seconds: u64) -> Duration {
        self.tick
            .saturating_mul(u32::try_from(seconds).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl DelayPort for TokioDelayAdapter {
    async fn delay(&self, seconds: u64) -> Result<(), ApplicationError> {
        if seconds == 0 {
            return Ok(());
        }

        let mut shutdown = self.shutdown.clone();
        // Resolves to false when the sender is gone without ever signalling;
        // that branch is then disabled and the sleep runs to completion.
        let stopped = async move { shutdown.wait_for(|stop| *stop).await.is_ok() };
        let sleep = tokio::time::sleep(self.duration_for(seconds));

        tokio::select! {
            () = sleep => Ok(()),
            true = stopped => {
                debug!(seconds, "Delay interrupted by shutdown");
                Err(ApplicationError::Interrupted(format!(
                    "Delay of {seconds}s interrupted by shutdown"
                )))
            },
        }
    }
}
