use async_trait::async_trait;
use pingwatch::config::{EffectiveServiceConfig, ExpectedValidation, HeaderPair, Method, Protocol};
use pingwatch::core::clock::ClockTrait;
use pingwatch::core::probe::{ProbeExecutor, ProbeHttpClient, ProbeResponse, ProbeStatus, ProbeTransportError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct FakeClock {
    base: Instant,
    advance_ns: AtomicU64,
    step_ns: u64,
}

impl FakeClock {
    fn with_latency_ms(latency_ms: u64) -> Self {
        Self {
            base: Instant::now(),
            advance_ns: AtomicU64::new(0),
            step_ns: latency_ms * 1_000_000,
        }
    }
}

impl ClockTrait for FakeClock {
    fn now(&self) -> Instant {
        let nanos = self.advance_ns.fetch_add(self.step_ns, Ordering::SeqCst);
        self.base + Duration::from_nanos(nanos)
    }

    fn utc_timestamp(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

enum FakeOutcome {
    Response { status: u16, headers: HashMap<String, String>, body: Vec<u8> },
    Timeout,
    Network(String),
}

struct FakeHttpClient {
    outcome: FakeOutcome,
}

#[async_trait]
impl ProbeHttpClient for FakeHttpClient {
    async fn execute(
        &self,
        _method: Method,
        _url: &str,
        _headers: &[(String, String)],
        _body: Option<Vec<u8>>,
        _timeout: Duration,
    ) -> Result<ProbeResponse, ProbeTransportError> {
        match &self.outcome {
            FakeOutcome::Response { status, headers, body } => Ok(ProbeResponse {
                status: *status,
                headers: headers.clone(),
                body_prefix: body.clone(),
            }),
            FakeOutcome::Timeout => Err(ProbeTransportError::Timeout),
            FakeOutcome::Network(detail) => Err(ProbeTransportError::Network(detail.clone())),
        }
    }
}

fn base_config() -> EffectiveServiceConfig {
    EffectiveServiceConfig {
        name: "Example".to_string(),
        protocol: Protocol::Https,
        method: Method::Get,
        resource: "https://example.gov/health".to_string(),
        expected: ExpectedValidation {
            status: 200,
            text: None,
            headers: None,
        },
        tags: vec![],
        headers: vec![],
        payload: None,
        interval_secs: 60,
        timeout_secs: 5.0,
        warning_threshold_secs: 2.0,
        max_retries: 0,
    }
}

fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[tokio::test]
async fn passes_when_status_matches_and_latency_is_low() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
        },
    };
    let clock = FakeClock::with_latency_ms(100);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;

    assert_eq!(outcome.status, ProbeStatus::Pass);
    assert_eq!(outcome.latency_ms, 100);
    assert_eq!(outcome.failure_reason, "");
    assert_eq!(outcome.http_status_code, 200);
}

#[tokio::test]
async fn fails_with_status_mismatch_message() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 503,
            headers: HashMap::new(),
            body: Vec::new(),
        },
    };
    let clock = FakeClock::with_latency_ms(50);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;

    assert_eq!(outcome.status, ProbeStatus::Fail);
    assert_eq!(outcome.failure_reason, "Expected status 200, got 503");
}

#[tokio::test]
async fn classifies_degraded_at_exactly_the_warning_threshold_boundary() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
        },
    };
    let clock = FakeClock::with_latency_ms(2000);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;

    assert_eq!(outcome.status, ProbeStatus::Degraded);
}

#[tokio::test]
async fn classifies_fail_at_exactly_the_timeout_boundary() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
        },
    };
    let clock = FakeClock::with_latency_ms(5000);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;

    assert_eq!(outcome.status, ProbeStatus::Fail);
}

#[tokio::test]
async fn text_validation_finds_a_match_in_the_body() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: HashMap::new(),
            body: b"status: OK, all good".to_vec(),
        },
    };
    let mut config = base_config();
    config.expected.text = Some("OK".to_string());
    let clock = FakeClock::with_latency_ms(10);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&config).await;

    assert_eq!(outcome.status, ProbeStatus::Pass);
    assert_eq!(outcome.text_validation_result, Some(true));
}

#[tokio::test]
async fn text_validation_failure_is_reported_in_the_reason() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: HashMap::new(),
            body: b"status: DOWN".to_vec(),
        },
    };
    let mut config = base_config();
    config.expected.text = Some("OK".to_string());
    let clock = FakeClock::with_latency_ms(10);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&config).await;

    assert_eq!(outcome.status, ProbeStatus::Fail);
    assert_eq!(outcome.failure_reason, "Expected text 'OK' not found");
}

#[tokio::test]
async fn header_validation_is_case_insensitive_on_name_and_case_sensitive_on_value() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: headers(&[("Content-Type", "application/json")]),
            body: Vec::new(),
        },
    };
    let mut config = base_config();
    config.expected.headers = Some(
        [("content-type".to_string(), "application/json".to_string())]
            .into_iter()
            .collect(),
    );
    let clock = FakeClock::with_latency_ms(10);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&config).await;

    assert_eq!(outcome.status, ProbeStatus::Pass);
}

#[tokio::test]
async fn connection_timeout_produces_the_canonical_reason() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Timeout,
    };
    let clock = FakeClock::with_latency_ms(5000);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;

    assert_eq!(outcome.status, ProbeStatus::Fail);
    assert_eq!(outcome.http_status_code, 0);
    assert_eq!(outcome.failure_reason, "Connection timeout");
}

#[tokio::test]
async fn network_error_is_reported_with_detail() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Network("connection refused".to_string()),
    };
    let clock = FakeClock::with_latency_ms(5);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;

    assert_eq!(outcome.status, ProbeStatus::Fail);
    assert_eq!(outcome.failure_reason, "Network error: connection refused");
}

#[tokio::test]
async fn pass_implies_empty_reason_and_non_pass_implies_non_empty() {
    let http = FakeHttpClient {
        outcome: FakeOutcome::Response {
            status: 200,
            headers: HashMap::new(),
            body: Vec::new(),
        },
    };
    let clock = FakeClock::with_latency_ms(100);
    let executor = ProbeExecutor::new(Arc::new(http), Arc::new(clock));

    let outcome = executor.probe(&base_config()).await;
    match outcome.status {
        ProbeStatus::Pass => assert!(outcome.failure_reason.is_empty()),
        ProbeStatus::Degraded | ProbeStatus::Fail => assert!(!outcome.failure_reason.is_empty()),
    }
}
