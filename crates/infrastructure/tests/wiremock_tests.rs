//! Integration tests for infrastructure crate
//!
//! Tests cover:
//! - Upstream forwarding with wiremock
//! - The chaos engine driven by the tokio delay adapter
//! - Configuration loading with property-based tests

use std::sync::Arc;
use std::time::Duration;

use application::{ChaosConfig, ChaosError, ChaosService, DelayPort, UpstreamPort};
use domain::{ChaosStrategy, ProxiedRequest};
use infrastructure::{AppConfig, ReqwestUpstreamAdapter, TokioDelayAdapter, UpstreamConfig};
use tokio::sync::watch;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn adapter_for(server: &MockServer) -> ReqwestUpstreamAdapter {
    ReqwestUpstreamAdapter::new(&UpstreamConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap()
}

// ============================================================================
// Upstream Adapter Tests
// ============================================================================

mod upstream_adapter_tests {
    use super::*;

    #[tokio::test]
    async fn forwards_method_path_query_headers_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(query_param("id", "7"))
            .and(header("x-trace", "abc"))
            .and(body_string("hello"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("x-order", "42")
                    .set_body_string("created"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = ProxiedRequest::new("POST", "/orders?id=7")
            .with_header("X-Trace", "abc")
            .with_body("hello");
        let response = adapter_for(&mock_server).forward(request).await.unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.header("x-order"), Some("42"));
        assert_eq!(response.body, b"created");
    }

    #[tokio::test]
    async fn upstream_error_status_is_returned_as_envelope() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&mock_server)
            .await;

        let response = adapter_for(&mock_server)
            .forward(ProxiedRequest::new("GET", "/flaky"))
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.body, b"busy");
    }

    #[tokio::test]
    async fn hop_by_hop_request_headers_are_not_forwarded() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let mut request = ProxiedRequest::new("GET", "/items").with_header("x-keep", "1");
        request
            .headers
            .push(("Proxy-Connection".to_string(), "keep-alive".to_string()));
        adapter_for(&mock_server).forward(request).await.unwrap();

        let received = mock_server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].headers.get("x-keep").is_some());
        assert!(received[0].headers.get("proxy-connection").is_none());
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&mock_server)
            .await;

        let response = adapter_for(&mock_server)
            .forward(ProxiedRequest::new("GET", "/old"))
            .await
            .unwrap();

        assert_eq!(response.status, 302);
        assert_eq!(response.header("location"), Some("/new"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/export"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 4096]))
            .mount(&mock_server)
            .await;

        let err = adapter_for(&mock_server)
            .with_max_body_size(1024)
            .forward(ProxiedRequest::new("GET", "/export"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            application::ApplicationError::ExternalService(ref msg) if msg.contains("exceeds limit")
        ));
    }

    #[tokio::test]
    async fn body_at_limit_is_accepted() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/export"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 1024]))
            .mount(&mock_server)
            .await;

        let response = adapter_for(&mock_server)
            .with_max_body_size(1024)
            .forward(ProxiedRequest::new("GET", "/export"))
            .await
            .unwrap();
        assert_eq!(response.body.len(), 1024);
    }

    #[tokio::test]
    async fn connection_failure_is_external_service_error() {
        let adapter = ReqwestUpstreamAdapter::new(&UpstreamConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
        })
        .unwrap();

        let err = adapter
            .forward(ProxiedRequest::new("GET", "/"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            application::ApplicationError::ExternalService(_)
        ));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&mock_server)
            .await;

        let adapter = ReqwestUpstreamAdapter::new(&UpstreamConfig {
            base_url: mock_server.uri(),
            timeout_secs: 1,
        })
        .unwrap();

        let err = adapter
            .forward(ProxiedRequest::new("GET", "/slow"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            application::ApplicationError::ExternalService(_)
        ));
    }
}

// ============================================================================
// Engine With Real Adapters
// ============================================================================

mod engine_tests {
    use super::*;

    fn engine(config: ChaosConfig, delay: TokioDelayAdapter) -> ChaosService {
        let delay: Arc<dyn DelayPort> = Arc::new(delay);
        ChaosService::new(config, delay).unwrap()
    }

    #[tokio::test]
    async fn no_chaos_forwards_to_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (_tx, rx) = watch::channel(false);
        let service = engine(ChaosConfig::default(), TokioDelayAdapter::new(rx));
        let upstream = adapter_for(&mock_server);

        let result = service
            .process_request("/orders", || upstream.forward(ProxiedRequest::new("GET", "/orders")))
            .await
            .unwrap();

        assert_eq!(result.strategy, ChaosStrategy::NoChaos);
        assert_eq!(result.status_code, 201);
    }

    #[tokio::test]
    async fn shutdown_interrupts_delayed_request() {
        let (tx, rx) = watch::channel(false);
        let service = Arc::new(engine(
            ChaosConfig::default().with_fixed_delay(30),
            TokioDelayAdapter::new(rx),
        ));

        let task = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .apply_strategy(ChaosStrategy::DelayRequest, || async {
                        Ok::<_, application::ApplicationError>(domain::ResponseEnvelope::empty(200))
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();

        let err = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap()
            .unwrap_err();
        assert!(matches!(
            err,
            ChaosError::Interrupted {
                strategy: ChaosStrategy::DelayRequest
            }
        ));
        assert_eq!(service.stats().delays_interrupted, 1);
    }

    #[tokio::test]
    async fn instant_request_delay_response_reaches_upstream_then_drops() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/commitTransaction"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let (_tx, rx) = watch::channel(false);
        let service = engine(
            ChaosConfig::default().with_fixed_delay(1),
            TokioDelayAdapter::new(rx).with_tick(Duration::from_millis(10)),
        );
        let upstream = adapter_for(&mock_server);

        let err = service
            .apply_strategy(ChaosStrategy::InstantRequestDelayResponse, || {
                upstream.forward(ProxiedRequest::new("POST", "/commitTransaction"))
            })
            .await
            .unwrap_err();

        assert!(err.is_cancellation());
        assert_eq!(err.delayed_by_secs(), 1);
    }
}

// ============================================================================
// Configuration Tests
// ============================================================================

mod config_tests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn toml_port_and_delay_are_applied(port in 1u16..=u16::MAX, delay in 0u64..3600) {
            let toml = format!(
                "[server]\nport = {port}\n[chaos]\nfixed_delay_period = true\ndelay_time_seconds = {delay}\n"
            );
            let config = AppConfig::from_toml_str(&toml).unwrap();
            prop_assert_eq!(config.server.port, port);
            prop_assert_eq!(config.chaos.delay_time_seconds, delay);
            prop_assert!(config.chaos.fixed_delay_period);
        }
    }

    #[test]
    fn validate_reports_broken_upstream() {
        let config = AppConfig::from_toml_str("[upstream]\nbase_url = \"localhost:9000\"\n").unwrap();
        let warnings = config.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, "UPSTREAM_SCHEME");
    }
}
