//! Driver Drowsiness Monitor API Server
//!
//! REST API for the driver monitoring dashboard: live status, sensor and
//! control input, the notification log, and Prometheus metrics.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use monitor::{
    DriverMonitor, LogSink, MonitorClock, MonitorRuntime, RepositorySink, SharedMonitor,
};
use sensor_source::{HttpTelemetry, SimulatedSource, TelemetryPoller};
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use storage::Repository;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
mod routes;

pub use config::AppConfig;
pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// The driver monitor, shared with the tick scheduler
    pub monitor: SharedMonitor,
    /// Notification log
    pub repository: Arc<Repository>,
    /// Clock the scheduler stamps ticks with
    pub clock: MonitorClock,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        monitor: SharedMonitor,
        repository: Arc<Repository>,
        clock: MonitorClock,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            monitor,
            repository,
            clock,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
    pub metrics: SystemMetrics,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub sensor: ComponentHealth,
    pub evaluator: ComponentHealth,
    pub storage: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ComponentHealth {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            detail: None,
        }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            detail: Some(detail.into()),
        }
    }
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub evaluations: u64,
    pub notification_count: usize,
    pub high_risk_alerts: u64,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/drowsiness_data", get(routes::status::get_drowsiness_data))
        .route("/api/v1/sensors", post(routes::sensors::post_sensors))
        .route(
            "/api/v1/controls/:control/:action",
            post(routes::controls::post_control),
        )
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .route(
            "/api/v1/alerts/:id/acknowledge",
            post(routes::alerts::acknowledge_alert),
        )
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let monitor = state.monitor.lock().await;
    let acquisition = monitor.acquisition();
    let sensor = if acquisition.available {
        ComponentHealth::ok()
    } else {
        ComponentHealth::degraded(
            acquisition
                .last_error
                .clone()
                .unwrap_or_else(|| "sensor unavailable".to_string()),
        )
    };
    let evaluator = if monitor.evaluations() > 0 {
        ComponentHealth::ok()
    } else {
        ComponentHealth::degraded("no evaluation yet")
    };

    let response = HealthResponse {
        status: if acquisition.available { "healthy" } else { "degraded" }.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus {
            sensor,
            evaluator,
            storage: ComponentHealth::ok(),
        },
        metrics: SystemMetrics {
            evaluations: monitor.evaluations(),
            notification_count: state.repository.count(),
            high_risk_alerts: monitor.alerts().high_risk_count(),
        },
    };

    Json(response)
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .ok_or(ApiError::MetricsUnavailable)
}

/// Initialize logging at `level` (falls back to info)
pub fn init_logging(level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from_str(level).unwrap_or(Level::INFO))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics recorder not installed: {}", e);
            None
        }
    }
}

/// Build the monitor, start the scheduler, and serve until ctrl-c
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let metrics = init_metrics();
    let repository = Arc::new(Repository::with_capacity(config.max_stored_notifications));

    let mut driver_monitor = DriverMonitor::new(config.monitor.clone())?;
    driver_monitor.add_notification_sink(Box::new(LogSink));
    driver_monitor.add_notification_sink(Box::new(RepositorySink::new(repository.clone())));
    driver_monitor.add_display_sink(Box::new(LogSink));
    let shared: SharedMonitor = Arc::new(Mutex::new(driver_monitor));

    let mut runtime = MonitorRuntime::new(shared.clone(), config.runtime.clone());
    runtime.spawn_ticks();
    if config.simulate {
        runtime.spawn_sampler(SimulatedSource::try_new(config.simulation.clone())?);
    }
    if let Some(url) = config.telemetry_url.as_deref() {
        let http = HttpTelemetry::new(url, Duration::from_millis(config.telemetry_timeout_ms))?;
        info!("Polling telemetry from {}", http.url());
        runtime.spawn_telemetry(TelemetryPoller::new(http));
    }

    let state = Arc::new(AppState::new(shared, repository, runtime.clock(), metrics));
    let app = create_router(state);

    info!("Starting API server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}
