//! Integration tests for HTTP handlers and the chaos middleware
#![allow(clippy::expect_used)]

use std::{
    future::IntoFuture,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use application::{
    ChaosConfig, ChaosService, DecisionMode, DelayPort, UpstreamPort, error::ApplicationError,
};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use domain::{ChaosStrategy, ProxiedRequest, ResponseEnvelope, VALID_STATUS_CODES};
use infrastructure::{AppConfig, ReqwestUpstreamAdapter, TokioDelayAdapter, UpstreamConfig};
use presentation_http::{routes::create_router, state::AppState};
use serde_json::{Value, json};
use tokio::sync::watch;

/// Upstream double that answers with a fixed response and counts calls
struct StubUpstream {
    status: u16,
    body: &'static str,
    fail: bool,
    calls: AtomicUsize,
}

impl StubUpstream {
    fn new(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(200, "")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamPort for StubUpstream {
    async fn forward(&self, request: ProxiedRequest) -> Result<ResponseEnvelope, ApplicationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApplicationError::ExternalService(
                "connection refused".to_string(),
            ));
        }
        Ok(ResponseEnvelope {
            status: self.status,
            headers: vec![
                ("x-upstream-path".to_string(), request.path_and_query),
                ("x-upstream-method".to_string(), request.method),
                ("connection".to_string(), "close".to_string()),
            ],
            body: self.body.as_bytes().to_vec(),
        })
    }

    fn base_url(&self) -> String {
        "http://stub".to_string()
    }
}

struct Harness {
    server: TestServer,
    chaos: Arc<ChaosService>,
    upstream: Arc<StubUpstream>,
    shutdown: watch::Sender<bool>,
}

fn harness_with_tick(chaos_config: ChaosConfig, upstream: StubUpstream, tick: Duration) -> Harness {
    let (shutdown, rx) = watch::channel(false);
    let delay: Arc<dyn DelayPort> = Arc::new(TokioDelayAdapter::new(rx).with_tick(tick));

    let mut config = AppConfig::default();
    config.chaos = chaos_config.clone();

    let chaos = Arc::new(ChaosService::new(chaos_config, delay).expect("engine"));
    let upstream = Arc::new(upstream);
    let port: Arc<dyn UpstreamPort> = Arc::clone(&upstream) as Arc<dyn UpstreamPort>;
    let state = AppState::new(Arc::clone(&chaos), port, Arc::new(config));

    let server = TestServer::new(create_router(state)).expect("Failed to create test server");
    Harness {
        server,
        chaos,
        upstream,
        shutdown,
    }
}

fn harness(chaos_config: ChaosConfig, upstream: StubUpstream) -> Harness {
    harness_with_tick(chaos_config, upstream, Duration::from_millis(1))
}

fn respect_active(strategy: ChaosStrategy) -> ChaosConfig {
    ChaosConfig::default()
        .with_decision_mode(DecisionMode::RespectActive)
        .with_initial_strategy(strategy)
        .with_fixed_delay(2)
}

// ============================================================================
// Admin API
// ============================================================================

#[tokio::test]
async fn health_returns_ok() {
    let h = harness(ChaosConfig::default(), StubUpstream::new(200, ""));

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_strategy"], "NO_CHAOS");
    assert_eq!(h.upstream.calls(), 0);
}

#[tokio::test]
async fn get_strategy_reports_defaults() {
    let h = harness(ChaosConfig::default(), StubUpstream::new(200, ""));

    let response = h.server.get("/chaos/strategy").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "strategy": "NO_CHAOS",
        "decision_mode": "legacy",
        "tracing_headers": false
    }));
}

#[tokio::test]
async fn put_strategy_changes_active_strategy() {
    let h = harness(ChaosConfig::default(), StubUpstream::new(200, ""));

    let response = h
        .server
        .put("/chaos/strategy")
        .json(&json!({"strategy": "BAD_REQUEST"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({"previous": "NO_CHAOS", "strategy": "BAD_REQUEST"}));
    assert_eq!(h.chaos.active_strategy(), ChaosStrategy::BadRequest);

    let current: Value = h.server.get("/chaos/strategy").await.json();
    assert_eq!(current["strategy"], "BAD_REQUEST");
}

#[tokio::test]
async fn put_unknown_strategy_is_rejected_and_keeps_current() {
    let h = harness(
        ChaosConfig::default().with_initial_strategy(ChaosStrategy::RandomHavoc),
        StubUpstream::new(200, ""),
    );

    let response = h
        .server
        .put("/chaos/strategy")
        .json(&json!({"strategy": "MELTDOWN"}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "bad_request");
    assert_eq!(h.chaos.active_strategy(), ChaosStrategy::RandomHavoc);
}

#[tokio::test]
async fn list_strategies_returns_all_names() {
    let h = harness(ChaosConfig::default(), StubUpstream::new(200, ""));

    let response = h.server.get("/chaos/strategies").await;

    response.assert_status_ok();
    response.assert_json(&json!([
        "NO_CHAOS",
        "INTERNAL_SERVER_ERROR",
        "BAD_REQUEST",
        "DELAY_REQUEST",
        "INSTANT_REQUEST_DELAY_RESPONSE",
        "RANDOM_HAVOC"
    ]));
}

#[tokio::test]
async fn stats_count_proxied_requests() {
    let h = harness(ChaosConfig::default(), StubUpstream::new(200, "ok"));

    h.server.get("/orders").await.assert_status_ok();
    h.server.get("/orders/7").await.assert_status_ok();

    let stats: Value = h.server.get("/chaos/stats").await.json();
    assert_eq!(stats["total_requests"], 2);
    assert_eq!(stats["no_chaos"], 2);
    assert_eq!(stats["producer_invocations"], 2);
}

// ============================================================================
// Proxy pass-through
// ============================================================================

#[tokio::test]
async fn ineligible_path_is_forwarded_untouched() {
    let h = harness(
        ChaosConfig::default().with_initial_strategy(ChaosStrategy::InternalServerError),
        StubUpstream::new(201, "created"),
    );

    let response = h.server.post("/orders?id=7").text("payload").await;

    response.assert_status(StatusCode::CREATED);
    response.assert_text("created");
    assert_eq!(response.header("x-upstream-path"), "/orders?id=7");
    assert_eq!(response.header("x-upstream-method"), "POST");
    assert!(response.headers().get("connection").is_none());
    assert_eq!(h.upstream.calls(), 1);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let h = harness(ChaosConfig::default(), StubUpstream::failing());

    let response = h.server.get("/orders").await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "upstream_error");

    let stats: Value = h.server.get("/chaos/stats").await.json();
    assert_eq!(stats["upstream_failures"], 1);
}

// ============================================================================
// Chaos strategies on eligible paths
// ============================================================================

#[tokio::test]
async fn bad_request_is_synthesized_without_upstream_call() {
    let h = harness(
        respect_active(ChaosStrategy::BadRequest),
        StubUpstream::new(200, "real"),
    );

    let response = h.server.post("/api/commitTransaction").await;

    response.assert_status_bad_request();
    assert!(response.as_bytes().is_empty());
    assert_eq!(h.upstream.calls(), 0);
}

#[tokio::test]
async fn internal_server_error_is_synthesized_without_upstream_call() {
    let h = harness(
        respect_active(ChaosStrategy::InternalServerError),
        StubUpstream::new(200, "real"),
    );

    let response = h.server.post("/commitTransaction").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(h.upstream.calls(), 0);
}

#[tokio::test]
async fn delay_request_is_dropped_with_gateway_timeout() {
    let h = harness(
        respect_active(ChaosStrategy::DelayRequest),
        StubUpstream::new(200, "real"),
    );

    let response = h.server.post("/commitTransaction").await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json();
    assert_eq!(body["code"], "chaos_dropped");
    assert_eq!(h.upstream.calls(), 0);
}

#[tokio::test]
async fn instant_request_delay_response_calls_upstream_then_drops() {
    let h = harness(
        respect_active(ChaosStrategy::InstantRequestDelayResponse),
        StubUpstream::new(200, "real"),
    );

    let response = h.server.post("/commitTransaction").await;

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(h.upstream.calls(), 1);
}

#[tokio::test]
async fn random_havoc_keeps_body_and_picks_table_status() {
    let h = harness(
        respect_active(ChaosStrategy::RandomHavoc).with_random_delay(2),
        StubUpstream::new(200, "real"),
    );

    for _ in 0..20 {
        let response = h.server.post("/commitTransaction").await;
        let status = response.status_code().as_u16();
        assert!(VALID_STATUS_CODES[..VALID_STATUS_CODES.len() - 1].contains(&status));
        response.assert_text("real");
    }
    assert_eq!(h.upstream.calls(), 20);
}

#[tokio::test]
async fn tracing_headers_describe_the_applied_chaos() {
    let h = harness(
        respect_active(ChaosStrategy::BadRequest).with_tracing_headers(true),
        StubUpstream::new(200, ""),
    );

    let chaotic = h.server.post("/commitTransaction").await;
    assert_eq!(chaotic.header("x-chaos-strategy"), "BAD_REQUEST");
    assert_eq!(chaotic.header("x-chaos-delayed-by"), "0");

    let calm = h.server.get("/orders").await;
    assert_eq!(calm.header("x-chaos-strategy"), "NO_CHAOS");
}

#[tokio::test]
async fn legacy_mode_never_synthesizes_errors() {
    let h = harness(
        ChaosConfig::default()
            .with_initial_strategy(ChaosStrategy::BadRequest)
            .with_fixed_delay(1),
        StubUpstream::new(200, "real"),
    );

    for _ in 0..30 {
        let status = h.server.post("/commitTransaction").await.status_code();
        assert!(
            status == StatusCode::OK || status == StatusCode::GATEWAY_TIMEOUT,
            "unexpected status {status}"
        );
    }
}

#[tokio::test]
async fn shutdown_interrupts_delayed_request() {
    let h = harness_with_tick(
        respect_active(ChaosStrategy::DelayRequest).with_fixed_delay(60),
        StubUpstream::new(200, ""),
        Duration::from_secs(1),
    );

    let request = h.server.post("/commitTransaction").into_future();
    let (response, ()) = tokio::join!(request, async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.shutdown.send_replace(true);
    });

    response.assert_status(StatusCode::GATEWAY_TIMEOUT);
    let body: Value = response.json();
    assert_eq!(body["code"], "chaos_interrupted");
}

// ============================================================================
// End to end against a real HTTP upstream
// ============================================================================

#[tokio::test]
async fn forwards_to_real_upstream() {
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/3"))
        .and(body_string("payload"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("x-item", "3")
                .set_body_string("accepted"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = AppConfig::default();
    config.upstream = UpstreamConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
    };
    let (_shutdown, rx) = watch::channel(false);
    let delay: Arc<dyn DelayPort> = Arc::new(TokioDelayAdapter::new(rx));
    let chaos = Arc::new(ChaosService::new(config.chaos.clone(), delay).expect("engine"));
    let upstream: Arc<dyn UpstreamPort> =
        Arc::new(ReqwestUpstreamAdapter::new(&config.upstream).expect("client"));
    let server = TestServer::new(create_router(AppState::new(chaos, upstream, Arc::new(config))))
        .expect("Failed to create test server");

    let response = server.put("/items/3").text("payload").await;

    response.assert_status(StatusCode::ACCEPTED);
    response.assert_text("accepted");
    assert_eq!(response.header("x-item"), "3");
}
