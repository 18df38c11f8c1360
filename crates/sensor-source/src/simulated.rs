//! Randomized stand-in for the cabin camera pipeline

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use signal_buffer::SensorUpdate;
use thiserror::Error;
use tracing::info;

use crate::{AcquisitionError, SensorSource};

/// Simulation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
    /// Eye closure drawn from [0, max) %
    pub eye_closed_max_pct: f32,
    /// Probability of a yawn on each sample
    pub yawn_probability: f64,
    /// Head pitch drawn from [-range, range) degrees
    pub pitch_range_deg: f32,
    /// Head yaw drawn from [-range, range) degrees
    pub yaw_range_deg: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            eye_closed_max_pct: 15.0,
            yawn_probability: 0.05,
            pitch_range_deg: 7.5,
            yaw_range_deg: 10.0,
        }
    }
}

/// Rejected simulation parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("{field} must be within [0, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        max: f32,
    },

    #[error("yawn_probability must be within [0, 1], got {0}")]
    Probability(f64),
}

impl SimulationConfig {
    /// Bounds every draw so the generator cannot be handed an empty or infinite range
    pub fn validate(&self) -> Result<(), SimulationError> {
        for (field, value, max) in [
            ("eye_closed_max_pct", self.eye_closed_max_pct, 100.0),
            ("pitch_range_deg", self.pitch_range_deg, 180.0),
            ("yaw_range_deg", self.yaw_range_deg, 180.0),
        ] {
            if !(0.0..=max).contains(&value) {
                return Err(SimulationError::OutOfRange { field, value, max });
            }
        }
        if !(0.0..=1.0).contains(&self.yawn_probability) {
            return Err(SimulationError::Probability(self.yawn_probability));
        }
        Ok(())
    }
}

/// Generates plausible face metrics from uniform draws
pub struct SimulatedSource {
    config: SimulationConfig,
    rng: StdRng,
    samples: u64,
}

impl SimulatedSource {
    /// Validated constructor
    pub fn try_new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Callers are expected to have run [`SimulationConfig::validate`]
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!("Simulated sensor source (seed: {:?})", config.seed);
        Self {
            config,
            rng,
            samples: 0,
        }
    }

    /// Draw one set of metrics
    pub fn next_update(&mut self) -> SensorUpdate {
        self.samples += 1;
        let eye = draw(&mut self.rng, 0.0, self.config.eye_closed_max_pct);
        let yawning = self.rng.gen_bool(self.config.yawn_probability.clamp(0.0, 1.0));
        let pitch = draw(&mut self.rng, -self.config.pitch_range_deg, self.config.pitch_range_deg);
        let yaw = draw(&mut self.rng, -self.config.yaw_range_deg, self.config.yaw_range_deg);

        SensorUpdate::face_metrics(eye, yawning, pitch, yaw)
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl SensorSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn sample(&mut self) -> Result<SensorUpdate, AcquisitionError> {
        Ok(self.next_update())
    }
}

/// Uniform draw from [low, high) rounded to one decimal
fn draw(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    if high <= low {
        return low;
    }
    let value: f32 = rng.gen_range(low..high);
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> SimulatedSource {
        SimulatedSource::new(SimulationConfig {
            seed: Some(seed),
            ..Default::default()
        })
    }

    #[test]
    fn test_values_within_ranges() {
        let mut source = seeded(7);
        for _ in 0..500 {
            let u = source.next_update();
            let eye = u.eye_closed_percent.unwrap();
            let pitch = u.head_pitch_deg.unwrap();
            let yaw = u.head_yaw_deg.unwrap();
            assert!((0.0..=15.0).contains(&eye));
            assert!((-7.5..=7.5).contains(&pitch));
            assert!((-10.0..=10.0).contains(&yaw));
            assert!(u.brake_active.is_none());
        }
        assert_eq!(source.samples(), 500);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..20 {
            assert_eq!(a.next_update(), b.next_update());
        }
    }

    #[test]
    fn test_degenerate_config() {
        let mut source = SimulatedSource::new(SimulationConfig {
            seed: Some(1),
            eye_closed_max_pct: 0.0,
            yawn_probability: 1.0,
            pitch_range_deg: 0.0,
            yaw_range_deg: 0.0,
        });
        let u = source.next_update();
        assert_eq!(u.eye_closed_percent, Some(0.0));
        assert_eq!(u.is_yawning, Some(true));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_nan_yawn_probability_rejected() {
        let config = SimulationConfig {
            yawn_probability: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::Probability(p)) if p.is_nan()
        ));
        assert!(SimulatedSource::try_new(config).is_err());

        let config = SimulationConfig {
            yawn_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_range_rejected() {
        let config = SimulationConfig {
            yaw_range_deg: f32::INFINITY,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimulationError::OutOfRange {
                field: "yaw_range_deg",
                value: f32::INFINITY,
                max: 180.0
            })
        );

        for config in [
            SimulationConfig {
                eye_closed_max_pct: f32::NAN,
                ..Default::default()
            },
            SimulationConfig {
                pitch_range_deg: -5.0,
                ..Default::default()
            },
        ] {
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_try_new_accepts_valid_config() {
        let mut source = SimulatedSource::try_new(SimulationConfig {
            seed: Some(9),
            ..Default::default()
        })
        .unwrap();
        assert!(source.next_update().eye_closed_percent.is_some());
    }

    #[tokio::test]
    async fn test_sample_never_fails() {
        let mut source = seeded(3);
        assert!(source.sample().await.is_ok());
        assert_eq!(source.name(), "simulated");
    }
}
