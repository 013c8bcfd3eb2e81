//! Structured logging setup and sensitive-field redaction.

use regex::Regex;
use std::sync::OnceLock;

/// Initializes the global tracing subscriber, honoring `LOG_LEVEL`
/// (defaulting to `info`) and falling back to `RUST_LOG` if set.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn redaction_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)authorization[:\s]+[^\s\n]+",
            r"(?i)bearer[:\s]+[^\s\n]+",
            r"(?i)token[:\s]+[^\s\n]+",
            r"(?i)password[:\s]+[^\s\n]+",
            r"(?i)api[_-]?key[:\s]+[^\s\n]+",
            r"(?i)secret[:\s]+[^\s\n]+",
            r"(?i)cookie[:\s]+[^\s\n]+",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

/// Strips sensitive field values (password, token, api_key, authorization,
/// cookie, secret) from a string before it is attached to a log event.
pub fn redact(text: &str) -> String {
    let mut redacted = text.to_string();
    for pattern in redaction_patterns() {
        redacted = pattern.replace_all(&redacted, "[REDACTED]").to_string();
    }
    redacted
}
