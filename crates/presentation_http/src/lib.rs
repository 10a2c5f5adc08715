//! Chaos proxy HTTP presentation layer
//!
//! This crate provides the reverse proxy, its chaos middleware and the admin
//! API for switching strategies at runtime.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod strategy_reload;

pub use error::ApiError;
pub use middleware::{ChaosLayer, ChaosMiddleware};
pub use routes::create_router;
pub use state::AppState;
pub use strategy_reload::{reload_strategy, spawn_strategy_reload_handler};
