//! HTTP status codes known to the chaos engine

use crate::errors::DomainError;

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Status codes random havoc may substitute for the real one.
///
/// Spans the informational, success, redirection, client-error and
/// server-error classes.
pub const VALID_STATUS_CODES: [u16; 40] = [
    100, 101, 200, 201, 202, 203, 204, 205, 206, 300, 301, 302, 303, 304, 305, 307, 400, 401, 402,
    403, 404, 405, 406, 407, 408, 409, 410, 411, 412, 413, 414, 415, 416, 417, 500, 501, 502, 503,
    504, 505,
];

/// Check that a number lies in the HTTP status code range
pub fn validate(code: u16) -> Result<u16, DomainError> {
    if (100..=999).contains(&code) {
        Ok(code)
    } else {
        Err(DomainError::InvalidStatusCode(code))
    }
}
