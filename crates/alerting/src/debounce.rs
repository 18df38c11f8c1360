//! Per-key emission rate limiting

use std::collections::HashMap;
use tracing::debug;

/// Default minimum interval between emissions of the same key (milliseconds)
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Suppresses repeated emissions of a logical event key inside a minimum
/// interval, independent of the evaluation cadence.
#[derive(Debug, Clone, Default)]
pub struct DebounceGate {
    last_emit: HashMap<String, u64>,
}

impl DebounceGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `now_ms` when `key` may be emitted.
    ///
    /// A `now_ms` earlier than the recorded emit counts as zero elapsed.
    pub fn should_emit(&mut self, key: &str, now_ms: u64, min_interval_ms: u64) -> bool {
        if let Some(&last) = self.last_emit.get(key) {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < min_interval_ms {
                debug!("Suppressed {}: {}ms since last emit", key, elapsed);
                return false;
            }
        }
        self.last_emit.insert(key.to_string(), now_ms);
        true
    }

    /// Last recorded emit time for a key
    pub fn last_emit(&self, key: &str) -> Option<u64> {
        self.last_emit.get(key).copied()
    }

    /// Forget a single key
    pub fn reset(&mut self, key: &str) {
        self.last_emit.remove(key);
    }

    /// Forget all keys
    pub fn clear(&mut self) {
        self.last_emit.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sequence() {
        let mut gate = DebounceGate::new();
        assert!(gate.should_emit("x", 0, 200));
        assert!(!gate.should_emit("x", 150, 200));
        assert!(gate.should_emit("x", 250, 200));
        assert_eq!(gate.last_emit("x"), Some(250));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut gate = DebounceGate::new();
        assert!(gate.should_emit("driver-status", 0, DEFAULT_DEBOUNCE_MS));
        assert!(gate.should_emit("seatbelt", 10, DEFAULT_DEBOUNCE_MS));
        assert!(!gate.should_emit("driver-status", 10, DEFAULT_DEBOUNCE_MS));
    }

    #[test]
    fn test_suppressed_call_does_not_extend_window() {
        let mut gate = DebounceGate::new();
        gate.should_emit("x", 0, 200);
        gate.should_emit("x", 199, 200);
        assert!(gate.should_emit("x", 200, 200));
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut gate = DebounceGate::new();
        gate.should_emit("x", 1000, 200);
        assert!(!gate.should_emit("x", 500, 200));
        assert!(gate.should_emit("x", 500, 0));
    }

    #[test]
    fn test_reset() {
        let mut gate = DebounceGate::new();
        gate.should_emit("x", 0, 200);
        gate.reset("x");
        assert!(gate.should_emit("x", 1, 200));
        gate.clear();
        assert_eq!(gate.last_emit("x"), None);
    }
}
