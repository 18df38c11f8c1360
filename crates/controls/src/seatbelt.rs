//! Seatbelt pressure classification
//!
//! A seatbelt-tension hold opens an evaluation window. When the window closes
//! the reading is classified against the pedal context at that moment:
//! brake ⇒ normal (brake), no pedal ⇒ suspicious, accelerator ⇒ normal.
//! Letting go before the window closes is an improper release.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::hold::{HoldRelease, HoldTimer, DEFAULT_HOLD_MS};

/// Result of one seatbelt hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatbeltClassification {
    Normal,
    NormalBrake,
    Suspicious,
    Improper,
}

impl SeatbeltClassification {
    /// Dashboard label
    pub fn label(self) -> &'static str {
        match self {
            SeatbeltClassification::Normal => "Normal",
            SeatbeltClassification::NormalBrake => "Normal (Brake)",
            SeatbeltClassification::Suspicious => "Suspicious Pressure",
            SeatbeltClassification::Improper => "Improper/Released",
        }
    }

    pub fn is_normal(self) -> bool {
        matches!(
            self,
            SeatbeltClassification::Normal | SeatbeltClassification::NormalBrake
        )
    }
}

impl fmt::Display for SeatbeltClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pedal state used to classify a closing window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PedalContext {
    pub accelerator_active: bool,
    pub brake_active: bool,
}

impl PedalContext {
    pub fn classify(self) -> SeatbeltClassification {
        if self.brake_active {
            SeatbeltClassification::NormalBrake
        } else if !self.accelerator_active {
            SeatbeltClassification::Suspicious
        } else {
            SeatbeltClassification::Normal
        }
    }
}

/// Seatbelt hold interaction built on [`HoldTimer`]
#[derive(Debug, Clone)]
pub struct SeatbeltMonitor {
    hold: HoldTimer,
    last: Option<SeatbeltClassification>,
}

impl SeatbeltMonitor {
    pub fn new(window_ms: u64) -> Self {
        Self {
            hold: HoldTimer::new(window_ms),
            last: None,
        }
    }

    /// Begin a hold; ignored while one is open
    pub fn press(&mut self, now_ms: u64) -> bool {
        self.hold.press(now_ms)
    }

    /// Advance the window; classifies once when it closes
    pub fn tick(&mut self, now_ms: u64, context: PedalContext) -> Option<SeatbeltClassification> {
        let mut window_closed = false;
        self.hold.tick(now_ms, || window_closed = true);
        if !window_closed {
            return None;
        }

        let result = context.classify();
        if result == SeatbeltClassification::Suspicious {
            warn!("Seatbelt pressure without pedal input");
        } else {
            info!("Seatbelt classified: {}", result);
        }
        self.record(result);
        Some(result)
    }

    /// End the hold. Releasing before the window closes yields `Improper`;
    /// a window that already closed keeps its classification.
    pub fn release(&mut self, now_ms: u64) -> Option<SeatbeltClassification> {
        match self.hold.release(now_ms) {
            HoldRelease::Cancelled { elapsed_ms } => {
                info!("Seatbelt released early after {}ms", elapsed_ms);
                self.record(SeatbeltClassification::Improper);
                Some(SeatbeltClassification::Improper)
            }
            HoldRelease::Completed | HoldRelease::NotHolding => None,
        }
    }

    pub fn is_holding(&self) -> bool {
        self.hold.is_holding()
    }

    /// Window progress for display (0-100)
    pub fn progress_percent(&self, now_ms: u64) -> f32 {
        self.hold.progress_percent(now_ms)
    }

    /// Most recent classification across sessions
    pub fn last_classification(&self) -> Option<SeatbeltClassification> {
        self.last
    }

    fn record(&mut self, result: SeatbeltClassification) {
        self.last = Some(result);
    }
}

impl Default for SeatbeltMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_window(context: PedalContext) -> Option<SeatbeltClassification> {
        let mut monitor = SeatbeltMonitor::default();
        monitor.press(0);
        let mut result = None;
        for t in (50..=6000).step_by(50) {
            if let Some(r) = monitor.tick(t, context) {
                assert!(result.is_none(), "classified twice");
                result = Some(r);
            }
        }
        result
    }

    #[test]
    fn test_brake_at_close() {
        let result = run_window(PedalContext {
            brake_active: true,
            accelerator_active: true,
        });
        assert_eq!(result.map(|r| r.label()), Some("Normal (Brake)"));
    }

    #[test]
    fn test_no_pedal_is_suspicious() {
        let result = run_window(PedalContext::default());
        assert_eq!(result.map(|r| r.label()), Some("Suspicious Pressure"));
    }

    #[test]
    fn test_accelerator_is_normal() {
        let result = run_window(PedalContext {
            accelerator_active: true,
            brake_active: false,
        });
        assert_eq!(result.map(|r| r.label()), Some("Normal"));
    }

    #[test]
    fn test_context_sampled_at_close() {
        let mut monitor = SeatbeltMonitor::default();
        monitor.press(0);
        let braking = PedalContext {
            brake_active: true,
            ..Default::default()
        };
        assert_eq!(monitor.tick(4950, braking), None);
        assert_eq!(
            monitor.tick(5000, PedalContext::default()),
            Some(SeatbeltClassification::Suspicious)
        );
    }

    #[test]
    fn test_early_release_is_improper() {
        let mut monitor = SeatbeltMonitor::default();
        monitor.press(0);
        monitor.tick(1000, PedalContext::default());

        let result = monitor.release(2000);
        assert_eq!(result.map(|r| r.label()), Some("Improper/Released"));
        assert_eq!(monitor.last_classification(), Some(SeatbeltClassification::Improper));
    }

    #[test]
    fn test_release_after_close_keeps_result() {
        let mut monitor = SeatbeltMonitor::default();
        monitor.press(0);
        monitor.tick(5000, PedalContext::default());

        assert_eq!(monitor.release(5200), None);
        assert_eq!(monitor.last_classification(), Some(SeatbeltClassification::Suspicious));
        assert!(!monitor.is_holding());
    }

    #[test]
    fn test_early_release_after_suspicious_session_is_improper() {
        let mut monitor = SeatbeltMonitor::default();
        monitor.press(0);
        assert_eq!(
            monitor.tick(5000, PedalContext::default()),
            Some(SeatbeltClassification::Suspicious)
        );
        assert_eq!(monitor.release(5100), None);

        assert!(monitor.press(6000));
        assert_eq!(monitor.release(7000), Some(SeatbeltClassification::Improper));
        assert_eq!(monitor.last_classification(), Some(SeatbeltClassification::Improper));
    }
}
