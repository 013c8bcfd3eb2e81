//! Bounded concurrent dispatch of probe tasks.

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Semaphore;

use crate::core::probe::ProbeOutcome;

/// Lifecycle state of a single worker slot, surfaced only for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Busy,
    Terminating,
    Terminated,
    Error,
}

/// Per-worker counters, not load-bearing for correctness.
#[derive(Debug)]
pub struct WorkerStats {
    pub id: usize,
    pub state: WorkerState,
    pub tasks_completed: AtomicU64,
    pub tasks_failed: AtomicU64,
    pub created_at: SystemTime,
}

impl WorkerStats {
    fn new(id: usize) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            tasks_completed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            created_at: SystemTime::now(),
        }
    }
}

/// Result of one settled task: either the probe ran to completion and
/// produced an outcome, or the task itself could not be run (a rejection;
/// this never happens in the production path since a probe never raises,
/// but is modeled so a batch can tolerate it without failing).
pub enum Settled {
    Fulfilled(ProbeOutcome),
    Rejected { service_name: String, reason: String },
}

/// Bounded worker pool: at most `size` probes run concurrently.
pub struct WorkerPool {
    size: usize,
    semaphore: Arc<Semaphore>,
    stats: Vec<Arc<WorkerStats>>,
}

impl WorkerPool {
    /// `size` of 0 resolves to `2 * available_parallelism`.
    pub fn new(size: usize) -> Self {
        let resolved = if size == 0 {
            2 * std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            size
        };

        let stats = (0..resolved).map(|id| Arc::new(WorkerStats::new(id))).collect();

        Self {
            size: resolved,
            semaphore: Arc::new(Semaphore::new(resolved)),
            stats,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Submit a batch of named tasks, running at most `size` concurrently,
    /// and wait for every task to settle. `service_name` tags each task so
    /// a rejection can still be attributed if the task panics.
    pub async fn run_batch<F, Fut>(&self, tasks: Vec<(String, F)>) -> Vec<Settled>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ProbeOutcome> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        let worker_count = self.size.max(1);
        let stats = self.stats.clone();

        stream::iter(tasks.into_iter().enumerate())
            .map(move |(index, (service_name, task))| {
                let semaphore = Arc::clone(&semaphore);
                let worker_stats = stats.get(index % worker_count).cloned();
                async move {
                    let permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => {
                            return Settled::Rejected {
                                service_name,
                                reason: "worker pool closed".to_string(),
                            }
                        }
                    };

                    let handle = tokio::spawn(task());
                    let result = handle.await;
                    drop(permit);

                    match result {
                        Ok(outcome) => {
                            if let Some(stats) = &worker_stats {
                                stats.tasks_completed.fetch_add(1, Ordering::Relaxed);
                            }
                            Settled::Fulfilled(outcome)
                        }
                        Err(join_err) => {
                            if let Some(stats) = &worker_stats {
                                stats.tasks_failed.fetch_add(1, Ordering::Relaxed);
                            }
                            Settled::Rejected {
                                service_name,
                                reason: format!("worker task panicked: {join_err}"),
                            }
                        }
                    }
                }
            })
            .buffer_unordered(worker_count)
            .collect()
            .await
    }

    /// Snapshot of per-worker counters for a shutdown-time tracing event.
    pub fn stats_snapshot(&self) -> Vec<(usize, u64, u64)> {
        self.stats
            .iter()
            .map(|s| {
                (
                    s.id,
                    s.tasks_completed.load(Ordering::Relaxed),
                    s.tasks_failed.load(Ordering::Relaxed),
                )
            })
            .collect()
    }
}
