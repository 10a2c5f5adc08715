//! Reverse proxy handler
//!
//! Forwards every non-admin request to the upstream service. Chaos is applied
//! around this handler by [`crate::middleware::ChaosLayer`].

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use domain::{ProxiedRequest, ResponseEnvelope, is_hop_by_hop};
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// Marks a response produced because the upstream call failed
///
/// The chaos middleware turns it back into an upstream error instead of
/// treating the 502 as an ordinary upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamFailure(pub String);

/// Forward the request upstream and relay the answer
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

    let request = headers
        .iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(v) => Some((name.as_str(), v)),
            Err(_) => {
                warn!(header = %name, "Skipping request header with non-UTF-8 value");
                None
            },
        })
        .fold(
            ProxiedRequest::new(method.as_str(), path_and_query),
            |request, (name, value)| request.with_header(name, value),
        )
        .with_body(body.to_vec());

    match state.upstream.forward(request).await {
        Ok(envelope) => {
            let status = envelope.status;
            envelope_response(envelope, status)
        },
        Err(e) => {
            debug!(error = %e, "Upstream forwarding failed");
            let message = e.to_string();
            let mut response = ApiError::from(e).into_response();
            response.extensions_mut().insert(UpstreamFailure(message));
            response
        },
    }
}

/// Build an HTTP response from an envelope, using `status` as the status code
///
/// Hop-by-hop and malformed headers are skipped. A status outside the HTTP
/// range becomes 502.
pub fn envelope_response(envelope: ResponseEnvelope, status: u16) -> Response {
    let mut response = Response::new(Body::from(envelope.body));
    *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);

    let headers = response.headers_mut();
    for (name, value) in envelope.headers {
        if is_hop_by_hop(&name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            headers.append(name, value);
        }
    }
    response
}
