//! Driver Sensor Sources
//!
//! Producers of [`SensorUpdate`]s for the monitor. No real capture pipeline
//! lives here; anything that can produce face metrics plugs in behind
//! [`SensorSource`]:
//! - Randomized simulation of the cabin camera metrics
//! - Replay of recorded samples
//! - Neutral fallback when acquisition fails
//! - Polling of the camera backend's telemetry endpoint

pub mod fallback;
pub mod replay;
pub mod simulated;
pub mod telemetry;

pub use fallback::{FallbackSource, SampleOutcome};
pub use replay::ReplaySource;
pub use simulated::{SimulatedSource, SimulationConfig, SimulationError};
pub use telemetry::{HttpTelemetry, TelemetryFetch, TelemetryPoller};

use signal_buffer::SensorUpdate;
use std::future::Future;
use thiserror::Error;

/// Sensor acquisition errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcquisitionError {
    #[error("Sensor unavailable: {0}")]
    Unavailable(String),

    #[error("Capture timeout")]
    Timeout,

    #[error("Source exhausted")]
    Exhausted,
}

/// Telemetry transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Anything that produces driver face metrics
pub trait SensorSource: Send {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Produce the next update
    fn sample(&mut self) -> impl Future<Output = Result<SensorUpdate, AcquisitionError>> + Send;
}
