//! Manual Control Routes

use axum::{
    extract::{Path, State},
    Json,
};
use monitor::{Control, ControlOutcome};

use crate::error::ApiError;
use crate::SharedState;

/// Press or release `accelerator`, `brake`, or `seatbelt`
pub async fn post_control(
    State(state): State<SharedState>,
    Path((control, action)): Path<(String, String)>,
) -> Result<Json<ControlOutcome>, ApiError> {
    let control: Control = control.parse()?;
    let now_ms = state.clock.now_ms();
    let mut monitor = state.monitor.lock().await;

    let outcome = match action.as_str() {
        "press" => monitor.press(control, now_ms),
        "release" => monitor.release(control, now_ms),
        other => return Err(ApiError::UnknownAction(other.to_string())),
    };
    Ok(Json(outcome))
}
