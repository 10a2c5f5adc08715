//! Inbound request captured for forwarding upstream

use serde::{Deserialize, Serialize};

/// Request headers that only make sense for a single connection hop.
pub const HOP_BY_HOP_HEADERS: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "host",
    "content-length",
];

/// Whether a header must not be copied across the proxy
#[must_use]
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| hop.eq_ignore_ascii_case(name))
}

/// A buffered inbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxiedRequest {
    /// HTTP method, e.g. `GET`
    pub method: String,
    /// Path plus optional query, always starting with `/`
    pub path_and_query: String,
    /// End-to-end headers
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Buffered body bytes
    #[serde(default)]
    pub body: Vec<u8>,
}

impl ProxiedRequest {
    /// Create a request without headers or body
    pub fn new(method: impl Into<String>, path_and_query: impl Into<String>) -> Self {
        let path = path_and_query.into();
        let path_and_query = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            method: method.into(),
            path_and_query,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header unless it is hop-by-hop
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !is_hop_by_hop(&name) {
            self.headers.push((name, value.into()));
        }
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }
}
