//! Probe execution: a DI'd HTTP client trait, a deadline applied per
//! request, and a pure classification step once the response (or error)
//! is in hand.

use async_trait::async_trait;
use futures::AsyncReadExt;
use isahc::config::{Configurable, RedirectPolicy};
use isahc::{HttpClient, Request};
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{EffectiveServiceConfig, Method};
use crate::core::clock::ClockTrait;
use super::types::{ProbeOutcome, ProbeStatus};

/// Cap on response body bytes read for text validation. Applied to every
/// probe regardless of whether text validation is configured.
pub const BODY_READ_CAP_BYTES: usize = 100 * 1024;

/// A completed HTTP response, truncated to [`BODY_READ_CAP_BYTES`].
pub struct ProbeResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body_prefix: Vec<u8>,
}

/// Transport-level failure: the request never produced a response.
#[derive(Debug, Clone)]
pub enum ProbeTransportError {
    Timeout,
    Network(String),
}

/// HTTP client abstraction for dependency injection and testing.
#[async_trait]
pub trait ProbeHttpClient: Send + Sync {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> Result<ProbeResponse, ProbeTransportError>;
}

/// Production HTTP client implementation using isahc, configured to never
/// follow redirects.
pub struct IsahcProbeClient {
    client: HttpClient,
}

impl IsahcProbeClient {
    pub fn new() -> Result<Self, isahc::Error> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::None)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProbeHttpClient for IsahcProbeClient {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        headers: &[(String, String)],
        body: Option<Vec<u8>>,
        timeout: Duration,
    ) -> Result<ProbeResponse, ProbeTransportError> {
        let method_str = match method {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        };

        let mut builder = Request::builder().method(method_str).uri(url).timeout(timeout);

        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let request = builder
            .body(body.unwrap_or_default())
            .map_err(|e| ProbeTransportError::Network(e.to_string()))?;

        let mut response = self.client.send_async(request).await.map_err(|e| {
            if e.kind() == isahc::error::ErrorKind::Timeout {
                ProbeTransportError::Timeout
            } else {
                ProbeTransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let mut response_headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                response_headers.insert(name.to_string(), value_str.to_string());
            }
        }

        // Never read more than the cap, regardless of whether text validation
        // is configured. A single `.read()` call only fills one chunk off the
        // wire, so loop until the cap is hit or the body is exhausted.
        let mut body_prefix = Vec::with_capacity(BODY_READ_CAP_BYTES.min(64 * 1024));
        let mut chunk = [0u8; 8192];
        let body = response.body_mut();
        while body_prefix.len() < BODY_READ_CAP_BYTES {
            let remaining = BODY_READ_CAP_BYTES - body_prefix.len();
            let to_read = remaining.min(chunk.len());
            let read = body
                .read(&mut chunk[..to_read])
                .await
                .map_err(|e| ProbeTransportError::Network(e.to_string()))?;
            if read == 0 {
                break;
            }
            body_prefix.extend_from_slice(&chunk[..read]);
        }

        Ok(ProbeResponse {
            status,
            headers: response_headers,
            body_prefix,
        })
    }
}

/// Stateless probe execution: a pure function of `(config, clock, http)` that
/// never raises — every failure path produces a FAIL [`ProbeOutcome`]. Cheap
/// to clone; holds only shared references to its collaborators so it can be
/// moved into spawned tasks.
#[derive(Clone)]
pub struct ProbeExecutor {
    http: std::sync::Arc<dyn ProbeHttpClient>,
    clock: std::sync::Arc<dyn ClockTrait>,
}

impl ProbeExecutor {
    pub fn new(http: std::sync::Arc<dyn ProbeHttpClient>, clock: std::sync::Arc<dyn ClockTrait>) -> Self {
        Self { http, clock }
    }

    /// Execute one probe against `config`.
    pub async fn probe(&self, config: &EffectiveServiceConfig) -> ProbeOutcome {
        let correlation_id = uuid::Uuid::new_v4();
        let start = self.clock.now();
        let timestamp = self.clock.utc_timestamp();

        let headers: Vec<(String, String)> = build_headers(config);
        let body = build_body(config);
        let timeout = Duration::from_secs_f64(config.timeout_secs);

        let result = self
            .http
            .execute(config.method, &config.resource, &headers, body, timeout)
            .await;

        // Measured through the clock abstraction (not `Instant::elapsed`) so
        // tests can inject deterministic latencies.
        let elapsed_ms = self.clock.now().duration_since(start).as_millis() as u64;

        match result {
            Ok(response) => self.classify(config, correlation_id, timestamp, elapsed_ms, response),
            Err(ProbeTransportError::Timeout) => ProbeOutcome {
                service_name: config.name.clone(),
                timestamp,
                method: config.method,
                status: ProbeStatus::Fail,
                latency_ms: elapsed_ms,
                http_status_code: 0,
                expected_status: config.expected.status,
                text_validation_result: None,
                header_validation_result: None,
                failure_reason: "Connection timeout".to_string(),
                correlation_id,
            },
            Err(ProbeTransportError::Network(detail)) => ProbeOutcome {
                service_name: config.name.clone(),
                timestamp,
                method: config.method,
                status: ProbeStatus::Fail,
                latency_ms: elapsed_ms,
                http_status_code: 0,
                expected_status: config.expected.status,
                text_validation_result: None,
                header_validation_result: None,
                failure_reason: format!("Network error: {detail}"),
                correlation_id,
            },
        }
    }

    fn classify(
        &self,
        config: &EffectiveServiceConfig,
        correlation_id: uuid::Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
        latency_ms: u64,
        response: ProbeResponse,
    ) -> ProbeOutcome {
        let status_match = response.status == config.expected.status;

        let text_validation_result = config.expected.text.as_ref().map(|needle| {
            String::from_utf8_lossy(&response.body_prefix).contains(needle.as_str())
        });

        let header_validation_result = config.expected.headers.as_ref().map(|expected| {
            expected
                .iter()
                .map(|(name, expected_value)| {
                    let actual = response
                        .headers
                        .iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(name))
                        .map(|(_, v)| v.as_str());
                    (name.clone(), actual == Some(expected_value.as_str()))
                })
                .collect::<HashMap<_, _>>()
        });

        let validation_passed = status_match
            && text_validation_result.unwrap_or(true)
            && header_validation_result
                .as_ref()
                .map(|m| m.values().all(|v| *v))
                .unwrap_or(true);

        let timeout_ms = (config.timeout_secs * 1000.0) as u64;
        let warning_ms = (config.warning_threshold_secs * 1000.0) as u64;

        let status = if !validation_passed {
            ProbeStatus::Fail
        } else if latency_ms >= timeout_ms {
            ProbeStatus::Fail
        } else if latency_ms >= warning_ms {
            ProbeStatus::Degraded
        } else {
            ProbeStatus::Pass
        };

        let failure_reason = match status {
            ProbeStatus::Pass => String::new(),
            ProbeStatus::Degraded => format!(
                "Latency {}ms exceeds warning threshold {}ms",
                latency_ms, warning_ms
            ),
            ProbeStatus::Fail => compose_failure_reason(
                config,
                response.status,
                latency_ms,
                timeout_ms,
                status_match,
                &text_validation_result,
                &header_validation_result,
            ),
        };

        ProbeOutcome {
            service_name: config.name.clone(),
            timestamp,
            method: config.method,
            status,
            latency_ms,
            http_status_code: response.status,
            expected_status: config.expected.status,
            text_validation_result,
            header_validation_result,
            failure_reason,
            correlation_id,
        }
    }
}

fn build_headers(config: &EffectiveServiceConfig) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = config
        .headers
        .iter()
        .map(|h| (h.name.clone(), h.value.clone()))
        .collect();

    if config.method == Method::Post && config.payload.is_some() {
        headers.push(("Content-Type".to_string(), "application/json".to_string()));
    }

    headers
}

fn build_body(config: &EffectiveServiceConfig) -> Option<Vec<u8>> {
    if config.method != Method::Post {
        return None;
    }
    config
        .payload
        .as_ref()
        .map(|payload| serde_json::to_vec(payload).unwrap_or_default())
}

fn compose_failure_reason(
    config: &EffectiveServiceConfig,
    actual_status: u16,
    latency_ms: u64,
    timeout_ms: u64,
    status_match: bool,
    text_validation_result: &Option<bool>,
    header_validation_result: &Option<HashMap<String, bool>>,
) -> String {
    let mut reasons = Vec::new();

    if !status_match {
        reasons.push(format!(
            "Expected status {}, got {}",
            config.expected.status, actual_status
        ));
    }

    if let Some(false) = text_validation_result {
        if let Some(text) = &config.expected.text {
            reasons.push(format!("Expected text '{text}' not found"));
        }
    }

    if let Some(results) = header_validation_result {
        if let Some(expected_headers) = &config.expected.headers {
            for (name, ok) in results {
                if !*ok {
                    let expected_value = expected_headers.get(name).map(String::as_str).unwrap_or("");
                    let actual_value = "missing or mismatched";
                    reasons.push(format!(
                        "Header '{name}' expected '{expected_value}', got '{actual_value}'"
                    ));
                }
            }
        }
    }

    if latency_ms >= timeout_ms {
        reasons.push("Connection timeout".to_string());
    }

    if reasons.is_empty() {
        reasons.push("Unknown validation failure".to_string());
    }

    reasons.join("; ")
}
