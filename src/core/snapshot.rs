//! Status snapshot publisher: atomically overwrites two JSON files with
//! identical content.

use crate::core::state::RuntimeStateMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to publish snapshot to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
pub struct ServiceProjection {
    pub name: String,
    pub status: String,
    pub latency_ms: Option<u64>,
    pub last_check_time: Option<String>,
    pub tags: Vec<String>,
    pub http_status_code: Option<u16>,
    pub failure_reason: String,
}

pub struct SnapshotPublisher {
    data_file: PathBuf,
    api_file: PathBuf,
}

impl SnapshotPublisher {
    pub fn new(data_file: impl Into<PathBuf>, api_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            api_file: api_file.into(),
        }
    }

    /// Project `states` and overwrite both output files, byte-for-byte
    /// identical. Any error is fatal by contract.
    pub async fn publish(&self, states: &RuntimeStateMap) -> Result<(), SnapshotError> {
        let projections: Vec<ServiceProjection> = states
            .sorted()
            .into_iter()
            .map(|state| ServiceProjection {
                name: state.name.clone(),
                status: state.current_status.to_string(),
                latency_ms: state.last_latency_ms,
                last_check_time: state
                    .last_check_time
                    .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
                tags: state.tags.clone(),
                http_status_code: state.last_http_status_code,
                failure_reason: state.last_failure_reason.clone(),
            })
            .collect();

        let content = serde_json::to_string_pretty(&projections)?;

        write_atomic(&self.data_file, &content).await?;
        write_atomic(&self.api_file, &content).await?;

        Ok(())
    }
}

async fn write_atomic(path: &Path, content: &str) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SnapshotError::Write {
                    path: path.display().to_string(),
                    source,
                })?;
        }
    }

    let temp_path = path.with_extension("tmp");

    tokio::fs::write(&temp_path, content)
        .await
        .map_err(|source| SnapshotError::Write {
            path: path.display().to_string(),
            source,
        })?;

    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|source| SnapshotError::Write {
            path: path.display().to_string(),
            source,
        })
}
