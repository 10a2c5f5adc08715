//! Delay port
//!
//! Defines the interruptible sleep the chaos engine uses to stall requests.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for suspending the current request
///
/// Implementations must only suspend the calling task and must stay
/// preemptible: an interruption (e.g. shutdown) surfaces promptly as
/// [`ApplicationError::Interrupted`], and dropping the future cancels the wait.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DelayPort: Send + Sync {
    /// Sleep for `seconds`, or fail with `Interrupted` if cut short
    async fn delay(&self, seconds: u64) -> Result<(), ApplicationError>;
}
