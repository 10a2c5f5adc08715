//! Shared active-strategy cell

use std::sync::atomic::{AtomicU8, Ordering};

use domain::ChaosStrategy;
use tracing::info;

/// Holds the process-wide active chaos strategy
///
/// Reads are a single atomic load and never block; writes are an atomic swap,
/// so concurrent setters cannot produce a torn value. Any strategy may follow
/// any other.
#[derive(Debug)]
pub struct StrategyState {
    active: AtomicU8,
}

impl Default for StrategyState {
    fn default() -> Self {
        Self::new(ChaosStrategy::default())
    }
}

impl StrategyState {
    /// Create the cell with an initial strategy
    pub const fn new(initial: ChaosStrategy) -> Self {
        Self {
            active: AtomicU8::new(initial.as_u8()),
        }
    }

    /// Currently active strategy
    pub fn get(&self) -> ChaosStrategy {
        // Only `as_u8` values are ever stored.
        ChaosStrategy::from_u8(self.active.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Replace the active strategy, returning the previous one
    pub fn set(&self, strategy: ChaosStrategy) -> ChaosStrategy {
        let previous = ChaosStrategy::from_u8(self.active.swap(strategy.as_u8(), Ordering::AcqRel))
            .unwrap_or_default();
        info!(from = %previous, to = %strategy, "Active chaos strategy changed");
        previous
    }
}
