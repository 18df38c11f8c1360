//! Snapshot Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use signal_buffer::SignalSnapshot;
use tracing::warn;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Eye closure valid range (%)
    pub eye_closed_range: (f32, f32),
    /// Head pitch valid range (degrees)
    pub head_pitch_range: (f32, f32),
    /// Head yaw valid range (degrees)
    pub head_yaw_range: (f32, f32),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            eye_closed_range: (0.0, 100.0),
            head_pitch_range: (-90.0, 90.0),
            head_yaw_range: (-90.0, 90.0),
        }
    }
}

impl ValidationConfig {
    /// Every range must be finite with `min <= max`
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, (min, max)) in [
            ("eye_closed_range", self.eye_closed_range),
            ("head_pitch_range", self.head_pitch_range),
            ("head_yaw_range", self.head_yaw_range),
        ] {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ValidationError::InvalidRange { field, min, max });
            }
        }
        Ok(())
    }
}

/// A snapshot forced into the valid ranges, plus what had to be fixed
#[derive(Debug, Clone)]
pub struct Sanitized {
    pub snapshot: SignalSnapshot,
    pub errors: Vec<ValidationError>,
}

impl Sanitized {
    /// Whether the input was already valid
    pub fn was_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Range validator for signal snapshots
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f32,
        range: (f32, f32),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            Err(ValidationError::NotFinite { field })
        } else if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Clamp every level channel into its valid range.
    ///
    /// Non-finite values fall back to the neutral value (0, clamped into range).
    pub fn sanitize(&self, snapshot: SignalSnapshot) -> Sanitized {
        let mut errors = Vec::new();
        let mut clean = snapshot;

        clean.eye_closed_percent = self.clamp_field(
            "eye_closed_percent",
            snapshot.eye_closed_percent,
            self.config.eye_closed_range,
            &mut errors,
        );
        clean.head_pitch_deg = self.clamp_field(
            "head_pitch_deg",
            snapshot.head_pitch_deg,
            self.config.head_pitch_range,
            &mut errors,
        );
        clean.head_yaw_deg = self.clamp_field(
            "head_yaw_deg",
            snapshot.head_yaw_deg,
            self.config.head_yaw_range,
            &mut errors,
        );

        for error in &errors {
            warn!("Clamped invalid input: {}", error);
        }

        Sanitized {
            snapshot: clean,
            errors,
        }
    }

    fn clamp_field(
        &self,
        field: &'static str,
        value: f32,
        range: (f32, f32),
        errors: &mut Vec<ValidationError>,
    ) -> f32 {
        match self.validate_range(field, value, range) {
            Ok(()) => value,
            Err(error) => {
                errors.push(error);
                let base = if value.is_finite() { value } else { 0.0 };
                base.clamp(range.0, range.1)
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
