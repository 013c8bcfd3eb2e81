//! Append-only CSV historical log writer.

use crate::core::probe::ProbeOutcome;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

const HEADER: &str = "timestamp,service_name,status,latency_ms,http_status_code,failure_reason,correlation_id\n";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to open history file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write history file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Writes ProbeOutcome batches as fixed-schema CSV rows. Header row is
/// written only the first time the file is created.
pub struct HistoryWriter {
    path: PathBuf,
}

impl HistoryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append every outcome in `outcomes`, in order, in a single write.
    /// Any error is fatal by contract: the caller is expected to exit
    /// non-zero rather than retry.
    pub async fn append(&self, outcomes: &[ProbeOutcome]) -> Result<(), HistoryError> {
        if outcomes.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| HistoryError::Open {
                        path: self.path.display().to_string(),
                        source,
                    })?;
            }
        }

        let needs_header = !self.path.exists();

        let mut body = String::new();
        if needs_header {
            body.push_str(HEADER);
        }
        for outcome in outcomes {
            body.push_str(&format_row(outcome));
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| HistoryError::Open {
                path: self.path.display().to_string(),
                source,
            })?;

        file.write_all(body.as_bytes())
            .await
            .map_err(|source| HistoryError::Write {
                path: self.path.display().to_string(),
                source,
            })?;

        file.flush().await.map_err(|source| HistoryError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn format_row(outcome: &ProbeOutcome) -> String {
    format!(
        "{},{},{},{},{},{},{}\n",
        outcome.timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        csv_escape(&outcome.service_name),
        outcome.status,
        outcome.latency_ms,
        outcome.http_status_code,
        csv_escape(&outcome.failure_reason),
        outcome.correlation_id,
    )
}

fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
