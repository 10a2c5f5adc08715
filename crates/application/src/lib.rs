//! Application layer - Use cases and orchestration
//!
//! Contains the chaos decision engine, the shared strategy state and the
//! port definitions for delaying and forwarding requests. Adapters in the
//! infrastructure layer implement the ports.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, ChaosError};
pub use ports::*;
pub use services::*;
