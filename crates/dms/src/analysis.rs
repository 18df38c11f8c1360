//! DMS analysis results

use serde::{Deserialize, Serialize};

use crate::state::{DriverState, SeverityBand};

/// Individual conditions that make a driver drowsy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrowsinessCause {
    /// Eye closure above threshold
    EyeClosure,

    /// Yawn in progress
    Yawning,

    /// Head pitch or yaw beyond threshold
    HeadTilt,
}

/// Complete result of evaluating one snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DmsAnalysis {
    /// Derived driver state
    pub driver_state: DriverState,

    /// Display band for eye closure
    pub eye_closure_band: SeverityBand,

    /// Display band for head tilt
    pub head_tilt_band: SeverityBand,

    /// Conditions that fired (empty when Normal)
    pub causes: Vec<DrowsinessCause>,
}

impl DmsAnalysis {
    pub fn is_drowsy(&self) -> bool {
        self.driver_state.is_drowsy()
    }

    /// Dashboard sub-text for the status panel
    pub fn status_subtext(&self) -> &'static str {
        if self.is_drowsy() {
            "Driver attention is low!"
        } else {
            "All systems operational"
        }
    }

    /// Most significant cause, if any
    pub fn primary_cause(&self) -> Option<DrowsinessCause> {
        // Priority: EyeClosure > HeadTilt > Yawning
        if self.causes.contains(&DrowsinessCause::EyeClosure) {
            Some(DrowsinessCause::EyeClosure)
        } else if self.causes.contains(&DrowsinessCause::HeadTilt) {
            Some(DrowsinessCause::HeadTilt)
        } else {
            self.causes.first().copied()
        }
    }
}
