//! HTTP middleware components
//!
//! This module contains the chaos middleware wrapped around the proxy
//! fallback.

pub mod chaos;

pub use chaos::{CHAOS_DELAYED_BY_HEADER, CHAOS_STRATEGY_HEADER, ChaosLayer, ChaosMiddleware};
