//! Application configuration
//!
//! Defaults, then an optional `dms-monitor.toml`, then `DMS__*` environment
//! variables (`DMS__MONITOR__DMS__EYE_CLOSED_THRESHOLD_PCT=12`).

use config::{Config, ConfigError, Environment, File};
use monitor::{MonitorConfig, RuntimeConfig};
use sensor_source::SimulationConfig;
use serde::{Deserialize, Serialize};

/// Default config file name (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "dms-monitor";

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listen address
    pub bind_addr: String,
    /// Max tracing level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Feed the monitor from the simulated camera source
    pub simulate: bool,
    /// Backend telemetry endpoint to poll, if any
    pub telemetry_url: Option<String>,
    pub telemetry_timeout_ms: u64,
    /// Notifications kept in the in-memory log
    pub max_stored_notifications: usize,
    pub monitor: MonitorConfig,
    pub runtime: RuntimeConfig,
    pub simulation: SimulationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            simulate: true,
            telemetry_url: None,
            telemetry_timeout_ms: 800,
            max_stored_notifications: storage::DEFAULT_MAX_RECORDS,
            monitor: MonitorConfig::default(),
            runtime: RuntimeConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path` (missing file is fine) plus environment overrides
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("DMS")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
