//! Camera-backend telemetry and its rule set

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DmsConfig;
use crate::state::DriverState;

/// Metrics published by the camera backend at ~1Hz
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    /// Eye aspect ratio (average of both eyes)
    pub ear: f32,
    /// Blinks counted over the last full minute
    pub blink_rate: u32,
    pub yawn_detected: bool,
    pub driver_state: DriverState,
}

/// Inputs to the backend rule set
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelemetryMetrics {
    pub blink_rate: u32,
    pub yawn_detected: bool,
    pub seatbelt_suspicious: bool,
}

impl From<&TelemetryReading> for TelemetryMetrics {
    fn from(reading: &TelemetryReading) -> Self {
        Self {
            blink_rate: reading.blink_rate,
            yawn_detected: reading.yawn_detected,
            seatbelt_suspicious: false,
        }
    }
}

/// Backend decision rules: excessive blinking, a recent yawn, or suspicious
/// seatbelt pressure each mean drowsy.
#[derive(Debug, Clone)]
pub struct TelemetryRules {
    blink_rate_threshold: u32,
}

impl TelemetryRules {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            blink_rate_threshold: config.blink_rate_threshold,
        }
    }

    pub fn determine_state(&self, metrics: &TelemetryMetrics) -> DriverState {
        if metrics.blink_rate > self.blink_rate_threshold {
            debug!("Blink rate {} > {}", metrics.blink_rate, self.blink_rate_threshold);
            return DriverState::Drowsy;
        }
        if metrics.yawn_detected || metrics.seatbelt_suspicious {
            return DriverState::Drowsy;
        }
        DriverState::Normal
    }
}

impl Default for TelemetryRules {
    fn default() -> Self {
        Self::new(&DmsConfig::default())
    }
}
