use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use pingwatch::cli::Cli;
use pingwatch::config;
use pingwatch::core::clock::SystemClock;
use pingwatch::core::history::HistoryWriter;
use pingwatch::core::lifecycle::{self, ShutdownFlag};
use pingwatch::core::orchestrator;
use pingwatch::core::pool::WorkerPool;
use pingwatch::core::probe::{IsahcProbeClient, ProbeExecutor};
use pingwatch::core::snapshot::SnapshotPublisher;
use pingwatch::core::state::RuntimeStateMap;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    pingwatch::logging::init();
    lifecycle::install_panic_hook();

    let cli = Cli::parse_args();

    let configuration = match config::load(cli.config.as_deref()) {
        Ok(configuration) => configuration,
        Err(err) => {
            error!(error = %err, "configuration is invalid");
            return ExitCode::FAILURE;
        }
    };

    if cli.validate_only {
        info!(service_count = configuration.pings.len(), "configuration is valid");
        return ExitCode::SUCCESS;
    }

    run(configuration, cli.once).await
}

async fn run(configuration: config::Configuration, once: bool) -> ExitCode {
    let settings = configuration.settings.clone();

    let services: Vec<config::EffectiveServiceConfig> = configuration
        .pings
        .iter()
        .map(|service| service.effective(&settings))
        .collect();

    let mut states = RuntimeStateMap::from_names(
        services
            .iter()
            .map(|service| (service.name.clone(), service.tags.clone())),
    );

    let http_client = match IsahcProbeClient::new() {
        Ok(client) => Arc::new(client),
        Err(err) => {
            error!(error = %err, "failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    let clock = Arc::new(SystemClock);
    let executor = ProbeExecutor::new(http_client, clock.clone());

    let worker_pool_size = settings.worker_pool_size as usize;
    let pool = WorkerPool::new(worker_pool_size);

    let history = HistoryWriter::new(settings.history_file.clone());

    let data_file = std::env::var("DATA_FILE").unwrap_or_else(|_| "_data/services.json".to_string());
    let api_file = std::env::var("API_FILE").unwrap_or_else(|_| "_site/api/status.json".to_string());
    let snapshot = SnapshotPublisher::new(data_file, api_file);

    let shutdown_flag = ShutdownFlag::new();
    let signal_task = {
        let flag = shutdown_flag.clone();
        tokio::spawn(async move {
            lifecycle::wait_for_shutdown_signal(flag).await;
        })
    };

    let check_interval = Duration::from_secs(settings.check_interval);
    let max_timeout = services
        .iter()
        .map(|s| s.timeout_secs)
        .fold(settings.timeout, f64::max);

    let mut ran_once = false;

    loop {
        if shutdown_flag.is_set() {
            break;
        }

        let cycle_result = orchestrator::cycle(
            &services,
            &pool,
            &executor,
            &history,
            &snapshot,
            &mut states,
            clock.as_ref(),
        )
        .await;

        let cycle_duration_ms = match &cycle_result {
            Ok(summary) => summary.duration_ms,
            Err(err) => {
                error!(error = %err, "fatal persistence error");
                signal_task.abort();
                return ExitCode::FAILURE;
            }
        };

        if once {
            ran_once = true;
            break;
        }

        if shutdown_flag.is_set() {
            break;
        }

        // Fixed-rate: the next cycle starts `check_interval` after this one
        // was initiated, not after it finished. A cycle that overruns the
        // interval starts the next one immediately.
        let sleep_duration = check_interval.saturating_sub(Duration::from_millis(cycle_duration_ms));

        tokio::select! {
            _ = tokio::time::sleep(sleep_duration) => {}
            _ = wait_until_shutdown(&shutdown_flag) => {}
        }

        if shutdown_flag.is_set() {
            break;
        }
    }

    if ran_once {
        signal_task.abort();
    } else {
        let drain_deadline = lifecycle::drain_deadline(Duration::from_secs_f64(max_timeout));
        let _ = tokio::time::timeout(drain_deadline, signal_task).await;
    }

    for (id, completed, failed) in pool.stats_snapshot() {
        info!(worker_id = id, tasks_completed = completed, tasks_failed = failed, "worker shutdown stats");
    }

    ExitCode::SUCCESS
}

async fn wait_until_shutdown(flag: &ShutdownFlag) {
    while !flag.is_set() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}
