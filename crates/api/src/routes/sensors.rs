//! Sensor Routes

use axum::{extract::State, Json};
use serde::Serialize;
use signal_buffer::SensorUpdate;
use tracing::debug;

use crate::SharedState;

/// Response for sensor ingestion
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub accepted: bool,
    /// Channels written by this update
    pub channels: usize,
    pub at_ms: u64,
}

/// Push a sensor update into the signal buffer
pub async fn post_sensors(
    State(state): State<SharedState>,
    Json(update): Json<SensorUpdate>,
) -> Json<IngestResponse> {
    let at_ms = state.clock.now_ms();
    let channels = update.writes().count();
    state.monitor.lock().await.ingest(&update, at_ms);
    debug!("Ingested {} channels at {}ms", channels, at_ms);

    Json(IngestResponse {
        accepted: true,
        channels,
        at_ms,
    })
}
