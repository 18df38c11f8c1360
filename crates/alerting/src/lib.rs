//! Alerting System
//!
//! Provides edge-triggered drowsiness escalation, per-key notification
//! debouncing, and the notification payloads handed to sinks.

mod debounce;
mod escalator;
mod manager;
mod notification;

pub use debounce::{DebounceGate, DEFAULT_DEBOUNCE_MS};
pub use escalator::{AlertEscalator, EscalationEvent, EscalationState, DEFAULT_ESCALATION_THRESHOLD};
pub use manager::{AlertConfig, AlertManager, STATUS_KEY};
pub use notification::{EmergencyContact, Notification, NotificationKind, VehicleLocation};
