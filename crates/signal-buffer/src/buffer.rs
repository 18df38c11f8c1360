//! Latest-Value Signal Buffer

use crate::{SensorChannel, SensorUpdate, SignalSnapshot, SignalValue};

/// A channel value with the time it was written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: SignalValue,
    pub at_ms: u64,
}

/// Latest value per sensor channel.
///
/// Writes are last-write-wins with no ordering check against `at_ms`; callers
/// own timestamp monotonicity. Channels never written read as neutral
/// (`0.0` / `false`).
#[derive(Debug, Clone, Default)]
pub struct SignalBuffer {
    /// One slot per channel, indexed by `SensorChannel::index`
    slots: [Option<Sample>; SensorChannel::COUNT],
}

impl SignalBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the current value of a channel
    pub fn set(&mut self, channel: SensorChannel, value: impl Into<SignalValue>, at_ms: u64) {
        self.slots[channel.index()] = Some(Sample {
            value: value.into(),
            at_ms,
        });
    }

    /// Latest sample for a channel, if it was ever written
    pub fn get(&self, channel: SensorChannel) -> Option<Sample> {
        self.slots[channel.index()]
    }

    /// Write every field present in an ingestion payload
    pub fn apply(&mut self, update: &SensorUpdate, at_ms: u64) {
        for (channel, value) in update.writes() {
            self.set(channel, value, at_ms);
        }
    }

    /// Immutable copy of all channels
    pub fn snapshot(&self) -> SignalSnapshot {
        let captured_at_ms = self
            .slots
            .iter()
            .flatten()
            .map(|s| s.at_ms)
            .max()
            .unwrap_or(0);

        SignalSnapshot {
            eye_closed_percent: self.level(SensorChannel::EyeClosure),
            is_yawning: self.flag(SensorChannel::Yawn),
            head_pitch_deg: self.level(SensorChannel::HeadPitch),
            head_yaw_deg: self.level(SensorChannel::HeadYaw),
            accelerator_active: self.flag(SensorChannel::Accelerator),
            brake_active: self.flag(SensorChannel::Brake),
            seatbelt_pressed: self.flag(SensorChannel::SeatbeltPressure),
            captured_at_ms,
        }
    }

    /// Number of channels written at least once
    pub fn written_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Forget all channel values
    pub fn clear(&mut self) {
        self.slots = Default::default();
    }

    fn level(&self, channel: SensorChannel) -> f32 {
        self.get(channel).map_or(0.0, |s| s.value.as_level())
    }

    fn flag(&self, channel: SensorChannel) -> bool {
        self.get(channel).map_or(false, |s| s.value.as_flag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unwritten_channels_are_neutral() {
        let buffer = SignalBuffer::new();
        let snapshot = buffer.snapshot();

        assert_eq!(snapshot, SignalSnapshot::default());
        assert_eq!(snapshot.captured_at_ms, 0);
        assert!(buffer.get(SensorChannel::Brake).is_none());
    }

    #[test]
    fn test_last_write_wins_regardless_of_timestamp() {
        let mut buffer = SignalBuffer::new();
        buffer.set(SensorChannel::EyeClosure, 12.0, 2000);
        buffer.set(SensorChannel::EyeClosure, 3.0, 1000);

        let sample = buffer.get(SensorChannel::EyeClosure).unwrap();
        assert_eq!(sample.value, SignalValue::Level(3.0));
        assert_eq!(sample.at_ms, 1000);
        assert_eq!(buffer.snapshot().eye_closed_percent, 3.0);
    }

    #[test]
    fn test_snapshot_merges_channels() {
        let mut buffer = SignalBuffer::new();
        buffer.apply(&SensorUpdate::face_metrics(7.5, true, -4.0, 9.0), 1000);
        buffer.set(SensorChannel::Brake, true, 1500);

        let snapshot = buffer.snapshot();
        assert_eq!(snapshot.eye_closed_percent, 7.5);
        assert!(snapshot.is_yawning);
        assert_eq!(snapshot.head_pitch_deg, -4.0);
        assert_eq!(snapshot.max_head_tilt(), 9.0);
        assert!(snapshot.brake_active);
        assert!(!snapshot.accelerator_active);
        assert_eq!(snapshot.captured_at_ms, 1500);
        assert_eq!(buffer.written_count(), 5);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let mut buffer = SignalBuffer::new();
        buffer.set(SensorChannel::Yawn, true, 10);
        let before = buffer.snapshot();

        buffer.set(SensorChannel::Yawn, false, 20);
        assert!(before.is_yawning);
        assert!(!buffer.snapshot().is_yawning);
    }

    #[test]
    fn test_clear() {
        let mut buffer = SignalBuffer::new();
        buffer.apply(&SensorUpdate::neutral(), 5);
        buffer.clear();
        assert_eq!(buffer.written_count(), 0);
    }

    proptest! {
        #[test]
        fn prop_latest_write_is_read_back(values in proptest::collection::vec(-100.0f32..100.0, 1..20)) {
            let mut buffer = SignalBuffer::new();
            for (i, v) in values.iter().enumerate() {
                buffer.set(SensorChannel::HeadYaw, *v, i as u64);
            }
            prop_assert_eq!(buffer.snapshot().head_yaw_deg, *values.last().unwrap());
        }
    }
}
