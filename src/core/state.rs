//! Live per-service runtime state, mutated only by the cycle orchestrator.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::core::probe::{ProbeOutcome, ProbeStatus};

/// Status of a service as tracked between cycles. `Pending` is the initial
/// value before a service's first probe completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeStatus {
    Pending,
    Pass,
    Degraded,
    Fail,
}

impl From<ProbeStatus> for RuntimeStatus {
    fn from(status: ProbeStatus) -> Self {
        match status {
            ProbeStatus::Pass => RuntimeStatus::Pass,
            ProbeStatus::Degraded => RuntimeStatus::Degraded,
            ProbeStatus::Fail => RuntimeStatus::Fail,
        }
    }
}

impl std::fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuntimeStatus::Pending => "PENDING",
            RuntimeStatus::Pass => "PASS",
            RuntimeStatus::Degraded => "DEGRADED",
            RuntimeStatus::Fail => "FAIL",
        };
        write!(f, "{s}")
    }
}

/// Sort tier used when projecting the snapshot: FAIL, DEGRADED, PASS, PENDING.
fn sort_rank(status: RuntimeStatus) -> u8 {
    match status {
        RuntimeStatus::Fail => 0,
        RuntimeStatus::Degraded => 1,
        RuntimeStatus::Pass => 2,
        RuntimeStatus::Pending => 3,
    }
}

#[derive(Debug, Clone)]
pub struct ServiceRuntimeState {
    pub name: String,
    pub tags: Vec<String>,
    pub current_status: RuntimeStatus,
    pub last_check_time: Option<DateTime<Utc>>,
    pub last_latency_ms: Option<u64>,
    pub last_http_status_code: Option<u16>,
    pub last_failure_reason: String,
    pub consecutive_failures: u64,
    insertion_order: usize,
}

impl ServiceRuntimeState {
    pub fn new(name: String, tags: Vec<String>, insertion_order: usize) -> Self {
        Self {
            name,
            tags,
            current_status: RuntimeStatus::Pending,
            last_check_time: None,
            last_latency_ms: None,
            last_http_status_code: None,
            last_failure_reason: String::new(),
            consecutive_failures: 0,
            insertion_order,
        }
    }

    /// Apply a settled outcome, resetting `consecutive_failures` on any
    /// non-FAIL result.
    pub fn apply_outcome(&mut self, outcome: &ProbeOutcome) {
        self.current_status = outcome.status.into();
        self.last_check_time = Some(outcome.timestamp);
        self.last_latency_ms = Some(outcome.latency_ms);
        self.last_http_status_code = Some(outcome.http_status_code);
        self.last_failure_reason = outcome.failure_reason.clone();

        if outcome.status == ProbeStatus::Fail {
            self.consecutive_failures += 1;
        } else {
            self.consecutive_failures = 0;
        }
    }
}

/// Ordered map of live service state, keyed by name, preserving the
/// original configuration order for stable snapshot tie-breaking.
pub struct RuntimeStateMap {
    states: HashMap<String, ServiceRuntimeState>,
}

impl RuntimeStateMap {
    pub fn from_names(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let mut states = HashMap::new();
        for (index, (name, tags)) in entries.into_iter().enumerate() {
            states.insert(name.clone(), ServiceRuntimeState::new(name, tags, index));
        }
        Self { states }
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ServiceRuntimeState> {
        self.states.get_mut(name)
    }

    pub fn get(&self, name: &str) -> Option<&ServiceRuntimeState> {
        self.states.get(name)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Services sorted FAIL, DEGRADED, PASS, PENDING, then by insertion order.
    pub fn sorted(&self) -> Vec<&ServiceRuntimeState> {
        let mut all: Vec<&ServiceRuntimeState> = self.states.values().collect();
        all.sort_by_key(|s| (sort_rank(s.current_status), s.insertion_order));
        all
    }
}
