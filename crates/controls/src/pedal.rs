//! Momentary pedal controls with release debounce

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default delay after release before a pedal counts as inactive (milliseconds)
pub const DEFAULT_DEACTIVATION_DELAY_MS: u64 = 3000;

/// Pedal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedalConfig {
    /// Time a pedal stays active after release
    pub deactivation_delay_ms: u64,
}

impl Default for PedalConfig {
    fn default() -> Self {
        Self {
            deactivation_delay_ms: DEFAULT_DEACTIVATION_DELAY_MS,
        }
    }
}

/// Accelerator or brake.
///
/// A brief release does not deactivate the pedal: it stays active until
/// `deactivation_delay_ms` has passed since release with no new press.
#[derive(Debug, Clone)]
pub struct PedalControl {
    name: &'static str,
    deactivation_delay_ms: u64,
    pressed: bool,
    released_at_ms: Option<u64>,
}

impl PedalControl {
    pub fn new(name: &'static str, config: &PedalConfig) -> Self {
        Self {
            name,
            deactivation_delay_ms: config.deactivation_delay_ms,
            pressed: false,
            released_at_ms: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn press(&mut self, now_ms: u64) {
        if !self.pressed {
            debug!("{} pressed at {}ms", self.name, now_ms);
        }
        self.pressed = true;
        self.released_at_ms = None;
    }

    /// Start the deactivation delay. Repeated releases keep the first release time.
    pub fn release(&mut self, now_ms: u64) {
        if self.pressed {
            debug!("{} released at {}ms", self.name, now_ms);
            self.pressed = false;
            self.released_at_ms = Some(now_ms);
        }
    }

    /// Whether the pedal counts as engaged at `now_ms`
    pub fn is_active(&self, now_ms: u64) -> bool {
        if self.pressed {
            return true;
        }
        match self.released_at_ms {
            Some(at) => now_ms.saturating_sub(at) < self.deactivation_delay_ms,
            None => false,
        }
    }

    /// Physically held right now (ignores the delay)
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brake() -> PedalControl {
        PedalControl::new("brake", &PedalConfig::default())
    }

    #[test]
    fn test_active_during_delay() {
        let mut pedal = brake();
        assert!(!pedal.is_active(0));

        pedal.press(100);
        assert!(pedal.is_active(150));

        pedal.release(1000);
        assert!(pedal.is_active(1000));
        assert!(pedal.is_active(3999));
        assert!(!pedal.is_active(4000));
    }

    #[test]
    fn test_press_cancels_delay() {
        let mut pedal = brake();
        pedal.press(0);
        pedal.release(500);
        pedal.press(1500);
        assert!(pedal.is_active(10_000));
        assert!(pedal.is_pressed());
    }

    #[test]
    fn test_repeated_release_does_not_extend() {
        let mut pedal = brake();
        pedal.press(0);
        pedal.release(1000);
        pedal.release(2500);
        assert!(!pedal.is_active(4000));
    }
}
