//! Driver Monitoring System (DMS)
//!
//! Turns driver signal snapshots into a discrete driver state:
//! - Eye closure, yawn and head pose rules (any one suffices)
//! - Display severity bands per metric
//! - Camera-backend telemetry rules (blink rate, yawn, seatbelt)

pub mod analysis;
pub mod config;
pub mod evaluator;
pub mod state;
pub mod telemetry;

pub use analysis::{DmsAnalysis, DrowsinessCause};
pub use config::DmsConfig;
pub use evaluator::DrowsinessEvaluator;
pub use state::{DriverState, SeverityBand};
pub use telemetry::{TelemetryMetrics, TelemetryReading, TelemetryRules};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),
}
