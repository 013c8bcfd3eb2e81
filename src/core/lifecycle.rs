//! Process signal handling and graceful shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::logging::redact;

/// Small safety window given to straggling probes after the last cycle's
/// own per-probe timeouts have already elapsed.
const DRAIN_SAFETY_WINDOW: Duration = Duration::from_secs(2);

/// Shared flag consulted by the cycle loop before starting a new cycle.
#[derive(Clone)]
pub struct ShutdownFlag {
    inner: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    fn set(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Installs SIGTERM/SIGINT handlers. On the first signal, sets `flag` so the
/// caller's scheduling loop stops starting new cycles; subsequent signals
/// are ignored while already draining.
pub async fn wait_for_shutdown_signal(flag: ShutdownFlag) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut interrupt = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

        tokio::select! {
            _ = terminate.recv() => info!("received SIGTERM, starting graceful shutdown"),
            _ = interrupt.recv() => info!("received SIGINT, starting graceful shutdown"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("received interrupt, starting graceful shutdown");
    }

    flag.set();
}

/// Bound the wait for in-flight work to drain: `max_in_flight_timeout` plus
/// the fixed safety window.
pub fn drain_deadline(max_in_flight_timeout: Duration) -> Duration {
    max_in_flight_timeout + DRAIN_SAFETY_WINDOW
}

/// Installs a process-wide panic hook that logs a fatal event before the
/// default hook runs. The caller is still responsible for mapping an
/// uncaught panic to exit code 1.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(panic = %redact(&info.to_string()), "uncaught panic");
        default_hook(info);
    }));
}
