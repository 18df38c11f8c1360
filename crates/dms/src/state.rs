//! Driver state and display severity

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete driver status, always derived from a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriverState {
    #[default]
    #[serde(alias = "Awake")]
    Normal,
    Drowsy,
}

impl DriverState {
    pub fn is_drowsy(self) -> bool {
        self == DriverState::Drowsy
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DriverState::Normal => "Normal",
            DriverState::Drowsy => "Drowsy",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display severity for a single metric (not part of the driver state)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    #[default]
    Low,
    Medium,
    High,
}

impl SeverityBand {
    /// Band for a value given medium and high cut-offs (both exclusive)
    pub fn classify(value: f32, medium: f32, high: f32) -> Self {
        if value > high {
            SeverityBand::High
        } else if value > medium {
            SeverityBand::Medium
        } else {
            SeverityBand::Low
        }
    }

    /// Dashboard colour for this band
    pub fn color(self) -> &'static str {
        match self {
            SeverityBand::Low => "green",
            SeverityBand::Medium => "orange",
            SeverityBand::High => "red",
        }
    }
}
