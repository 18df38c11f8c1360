//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use monitor::MonitorError;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error("Unknown control action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Metrics exporter not installed")]
    MetricsUnavailable,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Monitor(MonitorError::UnknownControl(_)) => StatusCode::NOT_FOUND,
            ApiError::Monitor(MonitorError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Monitor(MonitorError::Validation(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnknownAction(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Storage(StorageError::LockPoisoned(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MetricsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
