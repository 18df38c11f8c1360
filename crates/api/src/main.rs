//! Driver Drowsiness Monitor - Main Entry Point

use anyhow::Context;
use api::{config::DEFAULT_CONFIG_FILE, init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let config = AppConfig::load(&path).with_context(|| format!("loading config from {}", path))?;

    init_logging(&config.log_level).context("installing tracing subscriber")?;

    info!("=== Driver Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "Thresholds: eyes > {}%, head tilt > {}°, escalation after {} drowsy ticks",
        config.monitor.dms.eye_closed_threshold_pct,
        config.monitor.dms.head_tilt_threshold_deg,
        config.monitor.alerts.escalation_threshold
    );

    run_server(config).await
}
