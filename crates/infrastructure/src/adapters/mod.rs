//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod reqwest_upstream_adapter;
mod tokio_delay_adapter;

pub use reqwest_upstream_adapter::{DEFAULT_MAX_BODY_SIZE, ReqwestUpstreamAdapter};
pub use tokio_delay_adapter::TokioDelayAdapter;
