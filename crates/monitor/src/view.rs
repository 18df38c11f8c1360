//! Dashboard view handed to display sinks

use alerting::EscalationState;
use controls::SeatbeltClassification;
use dms::{DmsAnalysis, DriverState, DrowsinessCause, SeverityBand, TelemetryReading};
use serde::{Deserialize, Serialize};
use signal_buffer::SignalSnapshot;

/// Sensor acquisition health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionStatus {
    pub available: bool,
    /// Whether the UI should offer a retry
    pub retryable: bool,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Default for AcquisitionStatus {
    fn default() -> Self {
        Self {
            available: true,
            retryable: false,
            consecutive_failures: 0,
            last_error: None,
        }
    }
}

/// Seatbelt panel
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeatbeltView {
    pub holding: bool,
    pub progress_percent: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<SeatbeltClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Everything the dashboard shows after one evaluation tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardView {
    pub at_ms: u64,
    pub driver_state: DriverState,
    pub status_subtext: String,
    pub status_color: String,

    pub eye_closed_percent: f32,
    pub eye_closure_band: SeverityBand,
    pub is_yawning: bool,
    pub head_pitch_deg: f32,
    pub head_yaw_deg: f32,
    pub head_tilt_band: SeverityBand,
    pub causes: Vec<DrowsinessCause>,

    pub escalation: EscalationState,
    pub high_risk_alerts: u64,

    pub accelerator_active: bool,
    pub brake_active: bool,
    pub seatbelt: SeatbeltView,

    pub sensor: AcquisitionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<TelemetryReading>,
    /// Verdict of the backend telemetry rules, when telemetry is available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_state: Option<DriverState>,
}

impl DashboardView {
    pub(crate) fn from_analysis(snapshot: &SignalSnapshot, analysis: &DmsAnalysis, at_ms: u64) -> Self {
        let status_color = match analysis.driver_state {
            DriverState::Normal => "green",
            DriverState::Drowsy => "red",
        };

        Self {
            at_ms,
            driver_state: analysis.driver_state,
            status_subtext: analysis.status_subtext().to_string(),
            status_color: status_color.to_string(),
            eye_closed_percent: snapshot.eye_closed_percent,
            eye_closure_band: analysis.eye_closure_band,
            is_yawning: snapshot.is_yawning,
            head_pitch_deg: snapshot.head_pitch_deg,
            head_yaw_deg: snapshot.head_yaw_deg,
            head_tilt_band: analysis.head_tilt_band,
            causes: analysis.causes.clone(),
            accelerator_active: snapshot.accelerator_active,
            brake_active: snapshot.brake_active,
            ..Default::default()
        }
    }

    /// Status line as shown on the dashboard, e.g. `"⚠️ Drowsy"`
    pub fn status_line(&self) -> String {
        let icon = match self.driver_state {
            DriverState::Normal => "✓",
            DriverState::Drowsy => "⚠️",
        };
        format!("{} {}", icon, self.driver_state)
    }
}
