//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Eye closure above which the driver is drowsy (%)
    pub eye_closed_threshold_pct: f32,

    /// Eye closure above which the display band turns medium (%)
    pub eye_closed_medium_pct: f32,

    /// Head tilt (max of |pitch|, |yaw|) above which the driver is drowsy (degrees)
    pub head_tilt_threshold_deg: f32,

    /// Head tilt above which the display band turns medium (degrees)
    pub head_tilt_medium_deg: f32,

    /// Blink rate above which the backend rules report drowsiness (blinks/min)
    pub blink_rate_threshold: u32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            eye_closed_threshold_pct: 10.0,
            eye_closed_medium_pct: 5.0,
            head_tilt_threshold_deg: 8.0,
            head_tilt_medium_deg: 4.0,
            blink_rate_threshold: 15,
        }
    }
}

impl DmsConfig {
    /// Create strict config (lower thresholds)
    pub fn strict() -> Self {
        Self {
            eye_closed_threshold_pct: 7.0,
            eye_closed_medium_pct: 3.5,
            head_tilt_threshold_deg: 6.0,
            head_tilt_medium_deg: 3.0,
            blink_rate_threshold: 12,
        }
    }

    /// Create lenient config (higher thresholds)
    pub fn lenient() -> Self {
        Self {
            eye_closed_threshold_pct: 15.0,
            eye_closed_medium_pct: 8.0,
            head_tilt_threshold_deg: 12.0,
            head_tilt_medium_deg: 6.0,
            blink_rate_threshold: 20,
        }
    }

    /// Check thresholds are usable
    pub fn validate(&self) -> Result<(), DmsError> {
        let pairs = [
            ("eye_closed", self.eye_closed_medium_pct, self.eye_closed_threshold_pct),
            ("head_tilt", self.head_tilt_medium_deg, self.head_tilt_threshold_deg),
        ];

        for (name, medium, high) in pairs {
            if !medium.is_finite() || !high.is_finite() || medium < 0.0 || high < 0.0 {
                return Err(DmsError::Config(format!(
                    "{} thresholds must be finite and non-negative",
                    name
                )));
            }
            if medium > high {
                return Err(DmsError::Config(format!(
                    "{} medium band {} exceeds threshold {}",
                    name, medium, high
                )));
            }
        }

        Ok(())
    }
}
