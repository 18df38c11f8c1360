//! Press-and-hold timer
//!
//! ```text
//!          press()             elapsed >= required
//!  Idle ────────────► Holding ─────────────────────► Triggered
//!   ▲                    │                              │
//!   │  release() (early) │                 release()    │
//!   └────────────────────┘◄─────────────────────────────┘
//! ```
//!
//! The trigger callback runs at most once per session no matter how finely
//! `tick` is called.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default hold duration (milliseconds)
pub const DEFAULT_HOLD_MS: u64 = 5000;

/// One press-to-trigger interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldSession {
    pub started_at_ms: u64,
    pub triggered: bool,
}

/// Phase reported by [`HoldTimer::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldStatus {
    /// No session
    Idle,
    /// Counting toward the threshold
    Holding { progress_percent: f32 },
    /// Threshold reached on this tick; the callback just ran
    Triggered,
    /// Already triggered earlier in this session
    Completed,
}

/// Outcome of [`HoldTimer::release`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldRelease {
    /// Released before the threshold; nothing fired
    Cancelled { elapsed_ms: u64 },
    /// Released after the trigger fired
    Completed,
    /// Nothing was held
    NotHolding,
}

/// "Hold input for duration D to trigger" state machine
#[derive(Debug, Clone)]
pub struct HoldTimer {
    required_ms: u64,
    session: Option<HoldSession>,
}

impl HoldTimer {
    pub fn new(required_ms: u64) -> Self {
        Self {
            required_ms,
            session: None,
        }
    }

    pub fn required_ms(&self) -> u64 {
        self.required_ms
    }

    pub fn session(&self) -> Option<HoldSession> {
        self.session
    }

    pub fn is_holding(&self) -> bool {
        self.session.map_or(false, |s| !s.triggered)
    }

    pub fn is_triggered(&self) -> bool {
        self.session.map_or(false, |s| s.triggered)
    }

    /// Start a session. Ignored (returns false) while one is already open.
    pub fn press(&mut self, now_ms: u64) -> bool {
        if self.session.is_some() {
            return false;
        }
        debug!("Hold started at {}ms (required {}ms)", now_ms, self.required_ms);
        self.session = Some(HoldSession {
            started_at_ms: now_ms,
            triggered: false,
        });
        true
    }

    /// Advance the session; runs `on_trigger` once when the threshold is crossed
    pub fn tick<F: FnOnce()>(&mut self, now_ms: u64, on_trigger: F) -> HoldStatus {
        let required_ms = self.required_ms;
        let Some(session) = self.session.as_mut() else {
            return HoldStatus::Idle;
        };
        if session.triggered {
            return HoldStatus::Completed;
        }

        let elapsed = now_ms.saturating_sub(session.started_at_ms);
        if elapsed >= required_ms {
            session.triggered = true;
            info!("Hold triggered after {}ms", elapsed);
            on_trigger();
            HoldStatus::Triggered
        } else {
            HoldStatus::Holding {
                progress_percent: progress(elapsed, required_ms),
            }
        }
    }

    /// Hold progress for display (0-100)
    pub fn progress_percent(&self, now_ms: u64) -> f32 {
        match self.session {
            None => 0.0,
            Some(s) if s.triggered => 100.0,
            Some(s) => progress(now_ms.saturating_sub(s.started_at_ms), self.required_ms),
        }
    }

    /// End the session and return to Idle
    pub fn release(&mut self, now_ms: u64) -> HoldRelease {
        match self.session.take() {
            None => HoldRelease::NotHolding,
            Some(s) if s.triggered => HoldRelease::Completed,
            Some(s) => {
                let elapsed_ms = now_ms.saturating_sub(s.started_at_ms);
                debug!("Hold cancelled after {}ms", elapsed_ms);
                HoldRelease::Cancelled { elapsed_ms }
            }
        }
    }
}

impl Default for HoldTimer {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_MS)
    }
}

fn progress(elapsed_ms: u64, required_ms: u64) -> f32 {
    if required_ms == 0 {
        return 100.0;
    }
    (elapsed_ms as f32 / required_ms as f32 * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_early_release_never_triggers() {
        let mut timer = HoldTimer::new(5000);
        let mut fired = 0;

        assert!(timer.press(0));
        for t in (0..5000).step_by(50) {
            timer.tick(t, || fired += 1);
        }
        assert_eq!(timer.release(4999), HoldRelease::Cancelled { elapsed_ms: 4999 });
        assert_eq!(timer.tick(6000, || fired += 1), HoldStatus::Idle);
        assert_eq!(fired, 0);
    }

    #[test]
    fn test_fifty_ms_ticks_trigger_once() {
        let mut timer = HoldTimer::new(5000);
        let mut fired = 0;

        timer.press(0);
        let mut triggered_ticks = 0;
        for i in 1..=100u64 {
            if timer.tick(i * 50, || fired += 1) == HoldStatus::Triggered {
                triggered_ticks += 1;
            }
        }
        // keep ticking well past the threshold
        for i in 101..=200u64 {
            timer.tick(i * 50, || fired += 1);
        }

        assert_eq!(fired, 1);
        assert_eq!(triggered_ticks, 1);
        assert_eq!(timer.release(10_000), HoldRelease::Completed);
    }

    #[test]
    fn test_reentrant_press_ignored() {
        let mut timer = HoldTimer::new(2000);
        assert!(timer.press(100));
        assert!(!timer.press(900));
        assert_eq!(timer.session().unwrap().started_at_ms, 100);
    }

    #[test]
    fn test_session_record_follows_phase() {
        let mut timer = HoldTimer::new(1000);
        assert_eq!(timer.session(), None);

        timer.press(200);
        assert_eq!(
            timer.session(),
            Some(HoldSession {
                started_at_ms: 200,
                triggered: false
            })
        );

        timer.tick(1200, || {});
        assert_eq!(timer.session().map(|s| s.triggered), Some(true));

        timer.release(1300);
        assert_eq!(timer.session(), None);
    }

    #[test]
    fn test_press_after_trigger_waits_for_release() {
        let mut timer = HoldTimer::new(2000);
        timer.press(0);
        timer.tick(2000, || {});
        assert!(!timer.press(2100));
        assert!(timer.is_triggered());

        timer.release(2200);
        assert!(timer.press(3000));
        assert!(timer.is_holding());
    }

    #[test]
    fn test_progress() {
        let mut timer = HoldTimer::new(5000);
        assert_eq!(timer.progress_percent(0), 0.0);

        timer.press(1000);
        assert_eq!(timer.tick(3500, || {}), HoldStatus::Holding { progress_percent: 50.0 });
        assert_eq!(timer.progress_percent(9000), 100.0);
    }

    proptest! {
        #[test]
        fn prop_at_most_once_any_granularity(step in 1u64..700, required in 1u64..6000) {
            let mut timer = HoldTimer::new(required);
            let mut fired = 0u32;
            timer.press(0);
            let mut t = 0;
            while t <= required + step {
                timer.tick(t, || fired += 1);
                t += step;
            }
            prop_assert_eq!(fired, 1);
        }
    }
}
