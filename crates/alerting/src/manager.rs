//! Alert Manager Implementation

use controls::SeatbeltClassification;
use dms::DriverState;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::debounce::{DebounceGate, DEFAULT_DEBOUNCE_MS};
use crate::escalator::{AlertEscalator, EscalationEvent, EscalationState, DEFAULT_ESCALATION_THRESHOLD};
use crate::notification::{EmergencyContact, Notification, NotificationKind, VehicleLocation};

/// Debounce key for status notifications
pub const STATUS_KEY: &str = "driver-status";

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Drowsy ticks that must be exceeded before a high-risk alert (default: 3)
    pub escalation_threshold: u32,
    /// Minimum interval between status notifications (milliseconds)
    pub debounce_ms: u64,
    /// Contacts attached to high-risk alerts
    pub emergency_contacts: Vec<EmergencyContact>,
    /// Location attached to high-risk alerts
    pub vehicle_location: VehicleLocation,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            emergency_contacts: vec![
                EmergencyContact::new("Emergency Services", "911", "emergency"),
                EmergencyContact::new("Family Member 1", "+1-555-0123", "family"),
                EmergencyContact::new("Medical Contact", "+1-555-0124", "medical"),
                EmergencyContact::new("Roadside Assistance", "+1-555-0125", "assistance"),
            ],
            vehicle_location: VehicleLocation::default(),
        }
    }
}

/// Turns per-tick driver states into notifications.
///
/// High-risk alerts are edge-triggered by the escalator and never debounced.
/// Status changes are compared against the last *published* status and rate
/// limited, so a suppressed change is published on a later tick.
pub struct AlertManager {
    config: AlertConfig,
    escalator: AlertEscalator,
    gate: DebounceGate,
    last_published: Option<DriverState>,
    high_risk_count: u64,
}

impl AlertManager {
    pub fn new(config: AlertConfig) -> Self {
        info!(
            "Creating alert manager (threshold {} ticks, debounce {}ms)",
            config.escalation_threshold, config.debounce_ms
        );
        Self {
            escalator: AlertEscalator::new(config.escalation_threshold),
            gate: DebounceGate::new(),
            last_published: None,
            high_risk_count: 0,
            config,
        }
    }

    /// Feed one evaluation tick
    pub fn process(&mut self, state: DriverState, now_ms: u64) -> Vec<Notification> {
        let mut notifications = Vec::new();

        if let Some(EscalationEvent::HighRisk { consecutive_ticks }) = self.escalator.update(state) {
            self.high_risk_count += 1;
            notifications.push(self.high_risk(consecutive_ticks, now_ms));
        }

        if self.last_published != Some(state) {
            if self.gate.should_emit(STATUS_KEY, now_ms, self.config.debounce_ms) {
                info!("Driver status: {}", state);
                let previous = self.last_published.map(DriverState::as_str);
                self.last_published = Some(state);
                notifications.push(Notification {
                    kind: NotificationKind::StatusChanged,
                    at_ms: now_ms,
                    driver_state: state,
                    payload: json!({ "status": state, "previous": previous }),
                });
            } else {
                debug!("Status change to {} deferred by debounce", state);
            }
        }

        notifications
    }

    /// Wrap a seatbelt classification for the sinks
    pub fn seatbelt_notification(
        &self,
        result: SeatbeltClassification,
        state: DriverState,
        now_ms: u64,
    ) -> Notification {
        Notification {
            kind: NotificationKind::SeatbeltClassified,
            at_ms: now_ms,
            driver_state: state,
            payload: json!({
                "classification": result,
                "label": result.label(),
                "suspicious": result == SeatbeltClassification::Suspicious,
            }),
        }
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.escalator.state()
    }

    /// Status most recently published to sinks
    pub fn last_published(&self) -> Option<DriverState> {
        self.last_published
    }

    /// High-risk alerts raised since creation
    pub fn high_risk_count(&self) -> u64 {
        self.high_risk_count
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Forget episode and debounce state (on driver change)
    pub fn reset(&mut self) {
        self.escalator.reset();
        self.gate.clear();
        self.last_published = None;
    }

    fn high_risk(&self, consecutive_ticks: u32, now_ms: u64) -> Notification {
        Notification {
            kind: NotificationKind::HighRisk,
            at_ms: now_ms,
            driver_state: DriverState::Drowsy,
            payload: json!({
                "message": "High risk drowsiness detected",
                "consecutive_ticks": consecutive_ticks,
                "contacts": self.config.emergency_contacts,
                "location": self.config.vehicle_location,
            }),
        }
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}
