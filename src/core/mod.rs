//! Probing engine: clock, probe execution, worker pool, runtime state,
//! cycle orchestration, persistence, and lifecycle control.

pub mod clock;
pub mod history;
pub mod lifecycle;
pub mod orchestrator;
pub mod pool;
pub mod probe;
pub mod snapshot;
pub mod state;
