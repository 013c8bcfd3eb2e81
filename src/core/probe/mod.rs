//! Probe execution: issuing one HTTP request and classifying its outcome.

mod executor;
mod types;

pub use executor::{
    IsahcProbeClient, ProbeExecutor, ProbeHttpClient, ProbeResponse, ProbeTransportError,
    BODY_READ_CAP_BYTES,
};
pub use types::{ProbeOutcome, ProbeStatus};
