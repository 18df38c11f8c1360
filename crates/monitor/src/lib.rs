//! Driver Monitor
//!
//! Ties the signal buffer, evaluator, escalator, and controls together and
//! drives them from a tick scheduler.

pub mod monitor;
pub mod runtime;
pub mod sink;
pub mod view;

pub use monitor::{Control, ControlOutcome, DriverMonitor, MonitorConfig, TickReport};
pub use runtime::{MonitorClock, MonitorRuntime, RuntimeConfig, SharedMonitor};
pub use sink::{ChannelSink, DisplaySink, LogSink, NotificationSink, RepositorySink};
pub use view::{AcquisitionStatus, DashboardView, SeatbeltView};

use thiserror::Error;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Unknown control: {0}")]
    UnknownControl(String),

    #[error(transparent)]
    Config(#[from] dms::DmsError),

    #[error(transparent)]
    Validation(#[from] data_validator::ValidationError),
}
