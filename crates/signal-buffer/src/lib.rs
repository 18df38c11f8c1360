//! Driver Signal Buffer
//!
//! Holds the latest value of every tracked sensor channel and produces
//! immutable snapshots for the evaluation tick.

mod buffer;

pub use buffer::{Sample, SignalBuffer};

use serde::{Deserialize, Serialize};

/// Tracked sensor channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorChannel {
    /// Eye closure percentage (0-100)
    EyeClosure,
    /// Yawn detected
    Yawn,
    /// Head pitch in degrees
    HeadPitch,
    /// Head yaw in degrees
    HeadYaw,
    /// Accelerator pedal engaged
    Accelerator,
    /// Brake pedal engaged
    Brake,
    /// Seatbelt tension above the hold threshold
    SeatbeltPressure,
}

impl SensorChannel {
    /// Number of channels
    pub const COUNT: usize = 7;

    /// All channels in storage order
    pub const ALL: [SensorChannel; Self::COUNT] = [
        SensorChannel::EyeClosure,
        SensorChannel::Yawn,
        SensorChannel::HeadPitch,
        SensorChannel::HeadYaw,
        SensorChannel::Accelerator,
        SensorChannel::Brake,
        SensorChannel::SeatbeltPressure,
    ];

    /// Storage slot for this channel
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Whether the channel carries a boolean flag rather than a level
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            SensorChannel::Yawn
                | SensorChannel::Accelerator
                | SensorChannel::Brake
                | SensorChannel::SeatbeltPressure
        )
    }
}

/// A single channel value.
///
/// Values are coerced on read: a flag read as a level is `1.0`/`0.0`, a level
/// read as a flag is `true` when non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SignalValue {
    Level(f32),
    Flag(bool),
}

impl SignalValue {
    /// Read as a numeric level
    pub fn as_level(self) -> f32 {
        match self {
            SignalValue::Level(v) => v,
            SignalValue::Flag(true) => 1.0,
            SignalValue::Flag(false) => 0.0,
        }
    }

    /// Read as a boolean flag
    pub fn as_flag(self) -> bool {
        match self {
            SignalValue::Level(v) => v != 0.0 && !v.is_nan(),
            SignalValue::Flag(b) => b,
        }
    }
}

impl From<f32> for SignalValue {
    fn from(v: f32) -> Self {
        SignalValue::Level(v)
    }
}

impl From<bool> for SignalValue {
    fn from(b: bool) -> Self {
        SignalValue::Flag(b)
    }
}

/// Immutable view of all channels at one evaluation tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSnapshot {
    /// Eye closure (0-100 %)
    pub eye_closed_percent: f32,
    pub is_yawning: bool,
    /// Head pitch (degrees, positive = down)
    pub head_pitch_deg: f32,
    /// Head yaw (degrees, positive = right)
    pub head_yaw_deg: f32,
    pub accelerator_active: bool,
    pub brake_active: bool,
    pub seatbelt_pressed: bool,
    /// Time of the most recent write that went into this snapshot
    pub captured_at_ms: u64,
}

impl SignalSnapshot {
    /// Largest absolute head angle (pitch or yaw)
    pub fn max_head_tilt(&self) -> f32 {
        self.head_pitch_deg.abs().max(self.head_yaw_deg.abs())
    }
}

/// Sensor ingestion payload.
///
/// Fields left out of the payload leave the corresponding channel untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_closed_percent: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_yawning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_pitch_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_yaw_deg: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerator_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brake_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seatbelt_pressed: Option<bool>,
}

impl SensorUpdate {
    /// Camera-derived metrics only (the minimum ingestion payload)
    pub fn face_metrics(
        eye_closed_percent: f32,
        is_yawning: bool,
        head_pitch_deg: f32,
        head_yaw_deg: f32,
    ) -> Self {
        Self {
            eye_closed_percent: Some(eye_closed_percent),
            is_yawning: Some(is_yawning),
            head_pitch_deg: Some(head_pitch_deg),
            head_yaw_deg: Some(head_yaw_deg),
            ..Default::default()
        }
    }

    /// Neutral face metrics, used when acquisition fails
    pub fn neutral() -> Self {
        Self::face_metrics(0.0, false, 0.0, 0.0)
    }

    /// Channel writes carried by this update
    pub fn writes(&self) -> impl Iterator<Item = (SensorChannel, SignalValue)> {
        [
            (SensorChannel::EyeClosure, self.eye_closed_percent.map(SignalValue::from)),
            (SensorChannel::Yawn, self.is_yawning.map(SignalValue::from)),
            (SensorChannel::HeadPitch, self.head_pitch_deg.map(SignalValue::from)),
            (SensorChannel::HeadYaw, self.head_yaw_deg.map(SignalValue::from)),
            (SensorChannel::Accelerator, self.accelerator_active.map(SignalValue::from)),
            (SensorChannel::Brake, self.brake_active.map(SignalValue::from)),
            (SensorChannel::SeatbeltPressure, self.seatbelt_pressed.map(SignalValue::from)),
        ]
        .into_iter()
        .filter_map(|(channel, value)| value.map(|v| (channel, v)))
    }
}
