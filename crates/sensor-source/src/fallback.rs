//! Neutral fallback on acquisition failure

use signal_buffer::SensorUpdate;
use tracing::{info, warn};

use crate::{AcquisitionError, SensorSource};

/// One sample from a [`FallbackSource`]
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOutcome {
    pub update: SensorUpdate,
    /// True when the update is the neutral substitute
    pub degraded: bool,
    /// Failure that caused the substitution
    pub error: Option<AcquisitionError>,
}

/// Wraps a source so sampling never fails.
///
/// A failed acquisition yields neutral face metrics and marks the source
/// degraded until a sample succeeds again. Every call retries the inner
/// source.
pub struct FallbackSource<S> {
    inner: S,
    consecutive_failures: u32,
    total_failures: u64,
}

impl<S: SensorSource> FallbackSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            consecutive_failures: 0,
            total_failures: 0,
        }
    }

    pub async fn next(&mut self) -> SampleOutcome {
        match self.inner.sample().await {
            Ok(update) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "Sensor source {} recovered after {} failures",
                        self.inner.name(),
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
                SampleOutcome {
                    update,
                    degraded: false,
                    error: None,
                }
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.total_failures += 1;
                metrics::counter!("dms_sensor_fallbacks_total").increment(1);
                warn!(
                    "Sensor source {} failed ({}), using neutral sample",
                    self.inner.name(),
                    e
                );
                SampleOutcome {
                    update: SensorUpdate::neutral(),
                    degraded: true,
                    error: Some(e),
                }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.consecutive_failures > 0
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplaySource;

    #[tokio::test]
    async fn test_failure_yields_neutral_and_recovers() {
        let mut source = FallbackSource::new(ReplaySource::new(vec![
            Err(AcquisitionError::Unavailable("camera busy".into())),
            Err(AcquisitionError::Timeout),
            Ok(SensorUpdate::face_metrics(12.0, true, 1.0, 2.0)),
        ]));

        let first = source.next().await;
        assert!(first.degraded);
        assert_eq!(first.update, SensorUpdate::neutral());
        assert!(matches!(first.error, Some(AcquisitionError::Unavailable(_))));

        source.next().await;
        assert!(source.is_degraded());
        assert_eq!(source.consecutive_failures(), 2);

        let third = source.next().await;
        assert!(!third.degraded);
        assert_eq!(third.update.eye_closed_percent, Some(12.0));
        assert!(!source.is_degraded());
        assert_eq!(source.total_failures(), 2);
    }
}
