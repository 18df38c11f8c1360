//! Edge-triggered drowsiness escalation

use dms::DriverState;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Reference number of Drowsy ticks that must be exceeded before escalating
pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 3;

/// Escalation counters for the current episode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationState {
    pub consecutive_drowsy_ticks: u32,
    pub alert_already_sent: bool,
}

/// Events produced by [`AlertEscalator::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscalationEvent {
    /// Drowsiness persisted past the threshold; fires once per episode
    HighRisk { consecutive_ticks: u32 },
}

/// Drives [`EscalationState`] from one driver state per tick.
///
/// A Drowsy streak longer than `threshold` ticks produces exactly one
/// `HighRisk`; a single Normal tick resets the episode silently.
#[derive(Debug, Clone)]
pub struct AlertEscalator {
    threshold: u32,
    state: EscalationState,
}

impl AlertEscalator {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            state: EscalationState::default(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn state(&self) -> EscalationState {
        self.state
    }

    pub fn update(&mut self, driver_state: DriverState) -> Option<EscalationEvent> {
        match driver_state {
            DriverState::Normal => {
                if self.state.consecutive_drowsy_ticks > 0 {
                    debug!(
                        "Episode ended after {} drowsy ticks",
                        self.state.consecutive_drowsy_ticks
                    );
                }
                self.state = EscalationState::default();
                None
            }
            DriverState::Drowsy => {
                self.state.consecutive_drowsy_ticks =
                    self.state.consecutive_drowsy_ticks.saturating_add(1);

                if self.state.consecutive_drowsy_ticks > self.threshold
                    && !self.state.alert_already_sent
                {
                    self.state.alert_already_sent = true;
                    warn!(
                        "High risk drowsiness detected ({} consecutive ticks)",
                        self.state.consecutive_drowsy_ticks
                    );
                    Some(EscalationEvent::HighRisk {
                        consecutive_ticks: self.state.consecutive_drowsy_ticks,
                    })
                } else {
                    None
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = EscalationState::default();
    }
}

impl Default for AlertEscalator {
    fn default() -> Self {
        Self::new(DEFAULT_ESCALATION_THRESHOLD)
    }
}
