//! Configuration loading and validation errors.

use thiserror::Error;

/// A single validation violation, optionally scoped to a field path
/// (e.g. `pings[2].expected.status`).
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub message: String,
    pub field_path: Option<String>,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_path: None,
        }
    }

    pub fn at(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_path: Some(field_path.into()),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field_path {
            Some(path) => write!(f, "{}: {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Fatal configuration error, carrying every violation found rather than
/// short-circuiting on the first one.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration file found; tried: {tried:?}")]
    NotFound { tried: Vec<String> },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration is invalid:\n{}", format_issues(.issues))]
    Invalid { issues: Vec<ValidationIssue> },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("  - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}
