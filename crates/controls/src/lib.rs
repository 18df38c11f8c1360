//! Driver Controls
//!
//! Tick-driven state machines for manual inputs:
//! - Press-and-hold timer with a one-shot trigger
//! - Accelerator/brake pedals with a release debounce
//! - Seatbelt pressure classification

pub mod hold;
pub mod pedal;
pub mod seatbelt;

pub use hold::{HoldRelease, HoldSession, HoldStatus, HoldTimer, DEFAULT_HOLD_MS};
pub use pedal::{PedalConfig, PedalControl, DEFAULT_DEACTIVATION_DELAY_MS};
pub use seatbelt::{PedalContext, SeatbeltClassification, SeatbeltMonitor};
