//! Drowsiness rule evaluation

use signal_buffer::SignalSnapshot;

use crate::analysis::{DmsAnalysis, DrowsinessCause};
use crate::config::DmsConfig;
use crate::state::{DriverState, SeverityBand};

/// Maps a snapshot to a driver state.
///
/// The rule is a disjunction: eye closure above threshold, a yawn, or head
/// tilt above threshold is each sufficient on its own. Evaluation is pure and
/// never fails; NaN inputs compare false and cannot trigger a condition.
#[derive(Debug, Clone, Default)]
pub struct DrowsinessEvaluator {
    config: DmsConfig,
}

impl DrowsinessEvaluator {
    pub fn new(config: DmsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }

    /// Derive the driver state for a snapshot
    pub fn evaluate(&self, snapshot: &SignalSnapshot) -> DriverState {
        if self.causes(snapshot).next().is_some() {
            DriverState::Drowsy
        } else {
            DriverState::Normal
        }
    }

    /// Evaluate and attach display bands and firing causes
    pub fn assess(&self, snapshot: &SignalSnapshot) -> DmsAnalysis {
        let causes: Vec<_> = self.causes(snapshot).collect();
        let driver_state = if causes.is_empty() {
            DriverState::Normal
        } else {
            DriverState::Drowsy
        };

        DmsAnalysis {
            driver_state,
            eye_closure_band: self.eye_closure_band(snapshot.eye_closed_percent),
            head_tilt_band: self.head_tilt_band(snapshot.head_pitch_deg, snapshot.head_yaw_deg),
            causes,
        }
    }

    /// Display band for eye closure (>10 high, >5 medium)
    pub fn eye_closure_band(&self, eye_closed_percent: f32) -> SeverityBand {
        SeverityBand::classify(
            eye_closed_percent,
            self.config.eye_closed_medium_pct,
            self.config.eye_closed_threshold_pct,
        )
    }

    /// Display band for head tilt magnitude (>8° high, >4° medium)
    pub fn head_tilt_band(&self, pitch_deg: f32, yaw_deg: f32) -> SeverityBand {
        SeverityBand::classify(
            pitch_deg.abs().max(yaw_deg.abs()),
            self.config.head_tilt_medium_deg,
            self.config.head_tilt_threshold_deg,
        )
    }

    fn causes<'a>(
        &'a self,
        snapshot: &'a SignalSnapshot,
    ) -> impl Iterator<Item = DrowsinessCause> + 'a {
        let eyes = snapshot.eye_closed_percent > self.config.eye_closed_threshold_pct;
        let tilt = snapshot.max_head_tilt() > self.config.head_tilt_threshold_deg;

        [
            (eyes, DrowsinessCause::EyeClosure),
            (snapshot.is_yawning, DrowsinessCause::Yawning),
            (tilt, DrowsinessCause::HeadTilt),
        ]
        .into_iter()
        .filter(|(fired, _)| *fired)
        .map(|(_, cause)| cause)
    }
}
