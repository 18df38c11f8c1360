//! Alert Routes

use alerting::NotificationKind;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use storage::NotificationRecord;
use uuid::Uuid;

use crate::error::ApiError;
use crate::SharedState;

/// Query parameters for alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Filter by notification kind
    pub kind: Option<NotificationKind>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    pub data: Vec<NotificationRecord>,
    pub count: usize,
    pub unacknowledged_count: usize,
}

/// Get stored notifications, newest first
pub async fn get_alerts(
    State(state): State<SharedState>,
    Query(params): Query<AlertQuery>,
) -> Result<Json<AlertResponse>, ApiError> {
    let limit = params.limit.min(500);
    let data = state.repository.recent(params.kind, limit)?;

    Ok(Json(AlertResponse {
        count: data.len(),
        unacknowledged_count: state.repository.unacknowledged_count(),
        data,
    }))
}

/// Acknowledge one notification
pub async fn acknowledge_alert(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.repository.acknowledge(id)?;
    Ok(Json(serde_json::json!({ "id": id, "acknowledged": true })))
}
