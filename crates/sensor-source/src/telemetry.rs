//! Camera backend telemetry polling
//!
//! The backend publishes `{ear, blink_rate, yawn_detected, driver_state}`.
//! Fetch failures are logged and the previous reading is kept; the next
//! natural poll is the only retry.

use dms::TelemetryReading;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::TransportError;

/// One request/response against the telemetry endpoint
pub trait TelemetryFetch: Send {
    fn fetch(&self) -> impl Future<Output = Result<TelemetryReading, TransportError>> + Send;
}

/// HTTP transport using reqwest
pub struct HttpTelemetry {
    client: reqwest::Client,
    url: String,
}

impl HttpTelemetry {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TelemetryFetch for HttpTelemetry {
    async fn fetch(&self) -> Result<TelemetryReading, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<TelemetryReading>()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }
}

/// Keeps the latest good telemetry reading
pub struct TelemetryPoller<F> {
    fetcher: F,
    last: Option<TelemetryReading>,
    failures: u64,
}

impl<F: TelemetryFetch> TelemetryPoller<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            last: None,
            failures: 0,
        }
    }

    /// Poll once. Returns the fresh reading, or the retained one on failure.
    pub async fn poll(&mut self) -> Option<&TelemetryReading> {
        match self.fetcher.fetch().await {
            Ok(reading) => {
                debug!("Telemetry: {:?}", reading);
                self.last = Some(reading);
            }
            Err(e) => {
                self.failures += 1;
                warn!("Telemetry poll failed, keeping previous values: {}", e);
            }
        }
        self.last.as_ref()
    }

    pub fn last(&self) -> Option<&TelemetryReading> {
        self.last.as_ref()
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::DriverState;
    use std::sync::Mutex;

    struct Scripted(Mutex<Vec<Result<TelemetryReading, TransportError>>>);

    impl TelemetryFetch for Scripted {
        async fn fetch(&self) -> Result<TelemetryReading, TransportError> {
            let mut script = self.0.lock().unwrap();
            if script.is_empty() {
                Err(TransportError::Request("script empty".into()))
            } else {
                script.remove(0)
            }
        }
    }

    fn reading(blink_rate: u32) -> TelemetryReading {
        TelemetryReading {
            ear: 0.31,
            blink_rate,
            yawn_detected: false,
            driver_state: DriverState::Normal,
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_reading() {
        let mut poller = TelemetryPoller::new(Scripted(Mutex::new(vec![
            Ok(reading(4)),
            Err(TransportError::Status(503)),
            Ok(reading(9)),
        ])));

        assert_eq!(poller.poll().await.map(|r| r.blink_rate), Some(4));
        assert_eq!(poller.poll().await.map(|r| r.blink_rate), Some(4));
        assert_eq!(poller.failures(), 1);
        assert_eq!(poller.poll().await.map(|r| r.blink_rate), Some(9));
    }

    #[tokio::test]
    async fn test_failure_before_first_reading() {
        let mut poller = TelemetryPoller::new(Scripted(Mutex::new(vec![])));
        assert!(poller.poll().await.is_none());
        assert!(poller.last().is_none());
    }

    #[tokio::test]
    async fn test_http_connection_refused_is_transport_error() {
        let http = HttpTelemetry::new("http://127.0.0.1:9/drowsiness_data", Duration::from_millis(500)).unwrap();
        assert_eq!(http.url(), "http://127.0.0.1:9/drowsiness_data");
        assert!(matches!(http.fetch().await, Err(TransportError::Request(_))));
    }
}
