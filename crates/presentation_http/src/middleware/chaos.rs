//! Chaos middleware for proxied requests
//!
//! Hands the wrapped service to the chaos engine as its response producer.
//! The inner service only runs when the resolved strategy needs the real
//! upstream response.

use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use application::{ApplicationError, ChaosService};
use axum::{
    body::Body,
    extract::Request,
    http::header::HeaderValue,
    response::{IntoResponse, Response},
};
use domain::{ChaosResult, ResponseEnvelope};
use tower::{Layer, Service};
use tracing::Instrument;

use crate::{
    error::ApiError,
    handlers::proxy::{UpstreamFailure, envelope_response},
};

/// Header carrying the resolved strategy
pub const CHAOS_STRATEGY_HEADER: &str = "X-Chaos-Strategy";

/// Header carrying the applied delay in seconds
pub const CHAOS_DELAYED_BY_HEADER: &str = "X-Chaos-Delayed-By";

/// Layer that applies chaos to the wrapped service
#[derive(Debug, Clone)]
pub struct ChaosLayer {
    chaos: Arc<ChaosService>,
    max_body_size: usize,
}

impl ChaosLayer {
    /// Create a layer buffering at most `max_body_size` bytes of response body
    #[must_use]
    pub const fn new(chaos: Arc<ChaosService>, max_body_size: usize) -> Self {
        Self {
            chaos,
            max_body_size,
        }
    }
}

impl<S> Layer<S> for ChaosLayer {
    type Service = ChaosMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ChaosMiddleware {
            inner,
            chaos: Arc::clone(&self.chaos),
            max_body_size: self.max_body_size,
        }
    }
}

/// Service that routes each request through the chaos engine
#[derive(Debug, Clone)]
pub struct ChaosMiddleware<S> {
    inner: S,
    chaos: Arc<ChaosService>,
    max_body_size: usize,
}

impl<S> Service<Request<Body>> for ChaosMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let uri = request.uri().path().to_string();
        let span = tracing::info_span!(
            "chaos_request",
            method = %request.method(),
            uri = %uri,
        );

        let mut inner = self.inner.clone();
        let chaos = Arc::clone(&self.chaos);
        let max_body_size = self.max_body_size;

        Box::pin(
            async move {
                let producer = move || async move {
                    let response = match inner.call(request).await {
                        Ok(response) => response,
                        Err(never) => match never {},
                    };
                    buffer_response(response, max_body_size).await
                };

                let response = match chaos.process_request(&uri, producer).await {
                    Ok(result) => completed_response(result, chaos.tracing_headers()),
                    Err(e) => ApiError::from(e).into_response(),
                };
                Ok(response)
            }
            .instrument(span),
        )
    }
}

/// Collect a response into an envelope
///
/// A response flagged with [`UpstreamFailure`] becomes an upstream error.
async fn buffer_response(
    response: Response<Body>,
    limit: usize,
) -> Result<ResponseEnvelope, ApplicationError> {
    if let Some(UpstreamFailure(message)) = response.extensions().get::<UpstreamFailure>() {
        return Err(ApplicationError::ExternalService(message.clone()));
    }

    let (parts, body) = response.into_parts();
    let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
        ApplicationError::ExternalService(format!("Failed to buffer upstream body: {e}"))
    })?;
    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(v) => Some((name.as_str().to_string(), v.to_string())),
            Err(_) => {
                tracing::warn!(header = %name, "Skipping response header with non-UTF-8 value");
                None
            },
        })
        .collect();

    Ok(ResponseEnvelope {
        status: parts.status.as_u16(),
        headers,
        body: body.to_vec(),
    })
}

fn completed_response(result: ChaosResult, tracing_headers: bool) -> Response {
    let ChaosResult {
        strategy,
        status_code,
        response,
        delayed_by_secs,
    } = result;

    let mut response = envelope_response(response, status_code);
    if tracing_headers {
        let headers = response.headers_mut();
        headers.insert(
            CHAOS_STRATEGY_HEADER,
            HeaderValue::from_static(strategy.as_str()),
        );
        headers.insert(CHAOS_DELAYED_BY_HEADER, HeaderValue::from(delayed_by_secs));
    }
    response
}
