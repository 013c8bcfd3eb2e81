//! Clock abstraction for dependency injection and deterministic tests.
//!
//! Lets probe timing and wall-clock timestamps be swapped out in tests
//! without sleeping real time.

use chrono::{DateTime, Utc};
use std::time::Instant;

/// Source of monotonic instants and wall-clock timestamps.
pub trait ClockTrait: Send + Sync {
    /// Monotonic instant, used for latency measurement.
    fn now(&self) -> Instant;
    /// Wall-clock UTC timestamp.
    fn utc_timestamp(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock.
#[derive(Default)]
pub struct SystemClock;

impl ClockTrait for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
