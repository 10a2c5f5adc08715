//! Response envelope entity
//!
//! Transport-neutral representation of an HTTP response: status, headers and
//! a fully buffered body. Produced by the upstream call or synthesized by the
//! chaos engine for error injection.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::status_code;

/// HTTP response as seen by the chaos engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status: u16,
    /// Header name/value pairs in arrival order
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Buffered body bytes
    #[serde(default)]
    pub body: Vec<u8>,
}

impl ResponseEnvelope {
    /// Create an envelope with the given status and body
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Result<Self, DomainError> {
        Ok(Self {
            status: status_code::validate(status)?,
            headers: Vec::new(),
            body: body.into(),
        })
    }

    /// Synthesize an envelope with no headers and an empty body
    #[must_use]
    pub const fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Append a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, matched case-insensitively
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether the status is in the 2xx class
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}
