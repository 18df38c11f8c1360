//! Replay of recorded samples

use signal_buffer::SensorUpdate;
use std::collections::VecDeque;

use crate::{AcquisitionError, SensorSource};

/// Yields recorded samples in order, then `Exhausted` (or loops)
pub struct ReplaySource {
    samples: VecDeque<Result<SensorUpdate, AcquisitionError>>,
    looping: bool,
}

impl ReplaySource {
    pub fn new(samples: impl IntoIterator<Item = Result<SensorUpdate, AcquisitionError>>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
            looping: false,
        }
    }

    /// Replay only successful samples
    pub fn from_updates(updates: impl IntoIterator<Item = SensorUpdate>) -> Self {
        Self::new(updates.into_iter().map(Ok))
    }

    /// Restart from the beginning once the recording ends
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }

    fn next_sample(&mut self) -> Result<SensorUpdate, AcquisitionError> {
        let sample = self.samples.pop_front().ok_or(AcquisitionError::Exhausted)?;
        if self.looping {
            self.samples.push_back(sample.clone());
        }
        sample
    }
}

impl SensorSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    async fn sample(&mut self) -> Result<SensorUpdate, AcquisitionError> {
        self.next_sample()
    }
}
