//! Probe inputs and outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Method;

/// Outcome classification produced by the classification state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStatus {
    Pass,
    Degraded,
    Fail,
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProbeStatus::Pass => "PASS",
            ProbeStatus::Degraded => "DEGRADED",
            ProbeStatus::Fail => "FAIL",
        };
        write!(f, "{s}")
    }
}

/// Immutable result of a single probe.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub service_name: String,
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    pub status: ProbeStatus,
    pub latency_ms: u64,
    pub http_status_code: u16,
    pub expected_status: u16,
    pub text_validation_result: Option<bool>,
    pub header_validation_result: Option<HashMap<String, bool>>,
    pub failure_reason: String,
    pub correlation_id: uuid::Uuid,
}
