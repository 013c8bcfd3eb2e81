//! Declarative configuration document types: a root [`Configuration`]
//! holding optional [`GlobalSettings`] and a non-empty list of
//! [`ServiceDefinition`]s. Deserialization is intentionally strict
//! (`deny_unknown_fields`) so that unrecognised keys are caught by serde
//! before cross-field validation runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_check_interval() -> u64 {
    60
}
fn default_warning_threshold() -> f64 {
    2.0
}
fn default_timeout() -> f64 {
    5.0
}
fn default_max_retries() -> u32 {
    3
}
fn default_worker_pool_size() -> u32 {
    0
}
fn default_history_file() -> String {
    "history.csv".to_string()
}

/// Global tunables, applied as defaults to every service unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    #[serde(default = "default_check_interval")]
    pub check_interval: u64,
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    #[serde(default = "default_timeout")]
    pub timeout: f64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_worker_pool_size")]
    pub worker_pool_size: u32,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            warning_threshold: default_warning_threshold(),
            timeout: default_timeout(),
            max_retries: default_max_retries(),
            worker_pool_size: default_worker_pool_size(),
            history_file: default_history_file(),
        }
    }
}

/// Protocol scheme a service is probed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Http,
    Https,
}

/// HTTP method used for the probe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
}

/// Pass criteria for one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedValidation {
    pub status: u16,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

/// A single probe target, as written in `pings:`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceDefinition {
    pub name: String,
    pub protocol: Protocol,
    pub method: Method,
    pub resource: String,
    pub expected: ExpectedValidation,

    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub headers: Option<Vec<HeaderPair>>,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,

    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default)]
    pub warning_threshold: Option<f64>,
}

/// A single request header name/value override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Root declarative document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    #[serde(default)]
    pub settings: GlobalSettings,
    pub pings: Vec<ServiceDefinition>,
}

/// Fully resolved per-service configuration, computed once per cycle by
/// merging [`GlobalSettings`] with any per-service overrides.
#[derive(Debug, Clone)]
pub struct EffectiveServiceConfig {
    pub name: String,
    pub protocol: Protocol,
    pub method: Method,
    pub resource: String,
    pub expected: ExpectedValidation,
    pub tags: Vec<String>,
    pub headers: Vec<HeaderPair>,
    pub payload: Option<serde_json::Value>,
    pub interval_secs: u64,
    pub timeout_secs: f64,
    pub warning_threshold_secs: f64,
    pub max_retries: u32,
}

impl ServiceDefinition {
    /// Merge this service's overrides onto the global defaults.
    pub fn effective(&self, settings: &GlobalSettings) -> EffectiveServiceConfig {
        EffectiveServiceConfig {
            name: self.name.clone(),
            protocol: self.protocol,
            method: self.method,
            resource: self.resource.clone(),
            expected: self.expected.clone(),
            tags: self.tags.clone().unwrap_or_default(),
            headers: self.headers.clone().unwrap_or_default(),
            payload: self.payload.clone(),
            interval_secs: self.interval.unwrap_or(settings.check_interval),
            timeout_secs: self.timeout.unwrap_or(settings.timeout),
            warning_threshold_secs: self
                .warning_threshold
                .unwrap_or(settings.warning_threshold),
            max_retries: settings.max_retries,
        }
    }
}
