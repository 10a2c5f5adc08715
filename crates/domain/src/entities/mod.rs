//! Domain entities

mod chaos_result;
mod proxied_request;
mod response_envelope;

pub use chaos_result::ChaosResult;
pub use proxied_request::{HOP_BY_HOP_HEADERS, ProxiedRequest, is_hop_by_hop};
pub use response_envelope::ResponseEnvelope;
