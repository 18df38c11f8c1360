//! Outbound notifications

use dms::DriverState;
use serde::{Deserialize, Serialize};

/// Notification event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Sustained drowsiness, once per episode
    HighRisk,
    /// Driver status differs from the last published one
    StatusChanged,
    /// A seatbelt hold finished with a classification
    SeatbeltClassified,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::HighRisk => "HighRisk",
            NotificationKind::StatusChanged => "StatusChanged",
            NotificationKind::SeatbeltClassified => "SeatbeltClassified",
        }
    }
}

/// Event delivered to notification sinks.
///
/// The core only guarantees emission; delivery is the sink's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(rename = "event")]
    pub kind: NotificationKind,
    pub at_ms: u64,
    pub driver_state: DriverState,
    pub payload: serde_json::Value,
}

/// Someone to reach when a high-risk alert fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub kind: String,
}

impl EmergencyContact {
    pub fn new(name: &str, phone: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: phone.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Last known vehicle position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

impl Default for VehicleLocation {
    fn default() -> Self {
        Self {
            lat: 37.7749,
            lng: -122.4194,
            address: "San Francisco, CA, USA".to_string(),
        }
    }
}
