//! Cycle orchestrator: ties the worker pool, probe executor, historical log,
//! and snapshot publisher together into one periodic pass over the service
//! list.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::EffectiveServiceConfig;
use crate::core::history::HistoryWriter;
use crate::core::pool::{Settled, WorkerPool};
use crate::core::probe::{ProbeExecutor, ProbeOutcome};
use crate::core::snapshot::SnapshotPublisher;
use crate::core::state::RuntimeStateMap;
use crate::error::MonitorError;
use crate::logging::redact;

#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub total: usize,
    pub pass_count: usize,
    pub degraded_count: usize,
    pub fail_count: usize,
    pub pending_count: usize,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub outcomes: Vec<ProbeOutcome>,
}

/// Run one probe cycle: submit every service to the pool, collect outcomes,
/// update runtime state, append history, and publish the snapshot.
///
/// Fails only on persistence errors; individual probe failures are captured
/// in outcomes and never abort the cycle.
pub async fn cycle(
    services: &[EffectiveServiceConfig],
    pool: &WorkerPool,
    executor: &ProbeExecutor,
    history: &HistoryWriter,
    snapshot: &SnapshotPublisher,
    states: &mut RuntimeStateMap,
    clock: &dyn crate::core::clock::ClockTrait,
) -> Result<CycleSummary, MonitorError> {
    let cycle_start = clock.now();
    let timestamp = clock.utc_timestamp();

    let tasks: Vec<(String, _)> = services
        .iter()
        .map(|config| {
            let executor = executor.clone();
            let config = config.clone();
            (config.name.clone(), move || async move { executor.probe(&config).await })
        })
        .collect();

    let settled = pool.run_batch(tasks).await;

    let mut outcomes = Vec::with_capacity(settled.len());
    let mut rejected_count = 0usize;

    for result in settled {
        match result {
            Settled::Fulfilled(outcome) => outcomes.push(outcome),
            Settled::Rejected { service_name, reason } => {
                rejected_count += 1;
                warn!(service_name = %service_name, reason = %redact(&reason), "pool rejection");
            }
        }
    }

    for outcome in &outcomes {
        if let Some(state) = states.get_mut(&outcome.service_name) {
            let previous = state.current_status;
            state.apply_outcome(outcome);
            if previous != state.current_status {
                info!(
                    service_name = %outcome.service_name,
                    previous_status = %previous,
                    new_status = %state.current_status,
                    consecutive_failures = state.consecutive_failures,
                    failure_reason = %redact(&outcome.failure_reason),
                    "status transition"
                );
            }
        }
    }

    history
        .append(&outcomes)
        .await
        .map_err(|e| MonitorError::History(std::io::Error::other(e.to_string())))?;

    snapshot
        .publish(states)
        .await
        .map_err(|e| MonitorError::Snapshot(std::io::Error::other(e.to_string())))?;

    let mut pass_count = 0;
    let mut degraded_count = 0;
    let mut fail_count = 0;
    for outcome in &outcomes {
        match outcome.status {
            crate::core::probe::ProbeStatus::Pass => pass_count += 1,
            crate::core::probe::ProbeStatus::Degraded => degraded_count += 1,
            crate::core::probe::ProbeStatus::Fail => fail_count += 1,
        }
    }
    let pending_count = states
        .sorted()
        .into_iter()
        .filter(|s| s.current_status == crate::core::state::RuntimeStatus::Pending)
        .count();

    if rejected_count > 0 {
        warn!(rejected_count, "cycle completed with pool rejections");
    }

    let duration_ms = cycle_start.elapsed().as_millis() as u64;

    info!(
        total = services.len(),
        pass_count,
        degraded_count,
        fail_count,
        pending_count,
        duration_ms,
        "cycle complete"
    );

    Ok(CycleSummary {
        total: services.len(),
        pass_count,
        degraded_count,
        fail_count,
        pending_count,
        duration_ms,
        timestamp,
        outcomes,
    })
}
