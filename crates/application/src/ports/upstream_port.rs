//! Upstream port
//!
//! Defines how a captured request reaches the real service behind the proxy.

use async_trait::async_trait;
use domain::{ProxiedRequest, ResponseEnvelope};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for forwarding a request to the upstream service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UpstreamPort: Send + Sync {
    /// Forward the request and buffer the complete response
    ///
    /// Transport failures map to [`ApplicationError::ExternalService`];
    /// upstream error statuses are returned as ordinary envelopes.
    async fn forward(&self, request: ProxiedRequest) -> Result<ResponseEnvelope, ApplicationError>;

    /// Base URL requests are forwarded to
    fn base_url(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn UpstreamPort) {}

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn UpstreamPort>();
    }

    #[tokio::test]
    async fn mock_forwards_request() {
        let mut mock = MockUpstreamPort::new();
        mock.expect_forward()
            .withf(|req| req.path_and_query == "/orders")
            .returning(|_| Ok(ResponseEnvelope::empty(204)));

        let response = mock
            .forward(ProxiedRequest::new("GET", "/orders"))
            .await
            .unwrap();
        assert_eq!(response.status, 204);
    }
}
