//! Top-level error types shared across module boundaries.

use thiserror::Error;

/// Errors that can terminate the monitor process.
///
/// Both variants are fatal: the caller is expected to log and exit non-zero
/// rather than retry.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to persist historical record: {0}")]
    History(#[source] std::io::Error),

    #[error("failed to publish status snapshot: {0}")]
    Snapshot(#[source] std::io::Error),
}
