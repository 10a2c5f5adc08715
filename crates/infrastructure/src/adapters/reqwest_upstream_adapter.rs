//! Upstream adapter - Implements UpstreamPort using reqwest

use std::time::Duration;

use application::error::ApplicationError;
use application::ports::UpstreamPort;
use async_trait::async_trait;
use domain::{ProxiedRequest, ResponseEnvelope, is_hop_by_hop};
use reqwest::{Client, Method};
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;

/// Response body cap used until [`ReqwestUpstreamAdapter::with_max_body_size`] is called
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Forwards proxied requests to the configured upstream service
#[derive(Debug, Clone)]
pub struct ReqwestUpstreamAdapter {
    client: Client,
    base_url: String,
    max_body_size: usize,
}

impl ReqwestUpstreamAdapter {
    /// Create an adapter from configuration
    ///
    /// Redirects are not followed; they are returned to the caller like any
    /// other upstream response.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ApplicationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(format!("chaos-proxy/{}", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ApplicationError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        })
    }

    /// Refuse upstream bodies larger than `bytes`
    #[must_use]
    pub const fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Read the body chunk by chunk, failing as soon as it exceeds the cap
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, ApplicationError> {
        let too_large = |len: u64| {
            ApplicationError::ExternalService(format!(
                "Upstream body of {len} bytes exceeds limit of {} bytes",
                self.max_body_size
            ))
        };

        let limit = u64::try_from(self.max_body_size).unwrap_or(u64::MAX);
        if let Some(len) = response.content_length().filter(|len| *len > limit) {
            return Err(too_large(len));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            ApplicationError::ExternalService(format!("Failed to read upstream body: {e}"))
        })? {
            if body.len() + chunk.len() > self.max_body_size {
                return Err(too_large((body.len() + chunk.len()) as u64));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }
}

#[async_trait]
impl UpstreamPort for ReqwestUpstreamAdapter {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path_and_query))]
    async fn forward(&self, request: ProxiedRequest) -> Result<ResponseEnvelope, ApplicationError> {
        let url = self.url_for(&request.path_and_query);
        let method = Method::from_bytes(request.method.as_bytes()).map_err(|e| {
            ApplicationError::ExternalService(format!("Invalid method {}: {e}", request.method))
        })?;

        let mut builder = self.client.request(method, &url);
        for (name, value) in &request.headers {
            if !is_hop_by_hop(name) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        let response = builder.body(request.body).send().await.map_err(|e| {
            warn!(error = %e, url = %url, "Upstream request failed");
            ApplicationError::ExternalService(format!("Upstream request to {url} failed: {e}"))
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| !is_hop_by_hop(name.as_str()))
            .filter_map(|(name, value)| match value.to_str() {
                Ok(v) => Some((name.as_str().to_string(), v.to_string())),
                Err(_) => {
                    warn!(header = %name, "Skipping upstream header with non-UTF-8 value");
                    None
                },
            })
            .collect();
        let body = self.read_body(response).await?;

        let envelope = ResponseEnvelope {
            status,
            headers,
            body,
        };
        if envelope.is_success() {
            debug!(status, bytes = envelope.body.len(), "Upstream responded");
        } else {
            debug!(status, bytes = envelope.body.len(), "Upstream responded with non-success status");
        }
        Ok(envelope)
    }

    fn base_url(&self) -> String {
        self.base_url.clone()
    }
}
