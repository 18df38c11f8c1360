//! Status Routes

use axum::{extract::State, Json};
use dms::TelemetryReading;
use monitor::DashboardView;
use serde::Serialize;

use crate::SharedState;

/// Response for the status endpoint
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub evaluations: u64,
    /// Latest dashboard view, absent before the first evaluation tick
    pub view: Option<DashboardView>,
}

/// Get the latest dashboard view
pub async fn get_status(State(state): State<SharedState>) -> Json<StatusResponse> {
    let monitor = state.monitor.lock().await;
    Json(StatusResponse {
        evaluations: monitor.evaluations(),
        view: monitor.last_view().cloned(),
    })
}

/// Legacy backend shape: `{ear, blink_rate, yawn_detected, driver_state}`
pub async fn get_drowsiness_data(State(state): State<SharedState>) -> Json<TelemetryReading> {
    Json(state.monitor.lock().await.telemetry_reading())
}
