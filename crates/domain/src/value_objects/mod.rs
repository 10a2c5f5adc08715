//! Value objects - Immutable domain primitives

mod chaos_strategy;
pub mod status_code;

pub use chaos_strategy::ChaosStrategy;
pub use status_code::VALID_STATUS_CODES;
