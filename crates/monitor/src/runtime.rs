//! Tick scheduler
//!
//! Evaluation and hold ticks share one task so they never interleave. Sensor
//! sampling and telemetry polling run in their own tasks so a slow source
//! cannot delay a tick. Every task takes the monitor lock only for the
//! duration of one synchronous update.

use sensor_source::{FallbackSource, SensorSource, TelemetryFetch, TelemetryPoller};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::monitor::DriverMonitor;

/// Monitor shared between the scheduler and the HTTP layer
pub type SharedMonitor = Arc<Mutex<DriverMonitor>>;

/// Tick cadences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Sensor sampling period (milliseconds)
    pub sample_interval_ms: u64,
    /// Drowsiness evaluation period (milliseconds)
    pub evaluation_interval_ms: u64,
    /// Seatbelt hold progress period (milliseconds)
    pub hold_tick_ms: u64,
    /// Backend telemetry polling period (milliseconds)
    pub telemetry_interval_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000,
            evaluation_interval_ms: 1000,
            hold_tick_ms: 50,
            telemetry_interval_ms: 1000,
        }
    }
}

/// Monotonic milliseconds since the runtime started
#[derive(Debug, Clone, Copy)]
pub struct MonitorClock {
    origin: Instant,
}

impl MonitorClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Owns the scheduler tasks and their shutdown signal
pub struct MonitorRuntime {
    monitor: SharedMonitor,
    clock: MonitorClock,
    config: RuntimeConfig,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl MonitorRuntime {
    pub fn new(monitor: SharedMonitor, config: RuntimeConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            monitor,
            clock: MonitorClock::start(),
            config,
            shutdown_tx,
            tasks: Vec::new(),
        }
    }

    pub fn clock(&self) -> MonitorClock {
        self.clock
    }

    pub fn monitor(&self) -> SharedMonitor {
        self.monitor.clone()
    }

    /// Start the evaluation and hold-progress ticks
    pub fn spawn_ticks(&mut self) {
        let task = run_ticks(
            self.monitor.clone(),
            self.clock,
            self.config.clone(),
            self.shutdown_tx.subscribe(),
        );
        self.tasks.push(tokio::spawn(task));
    }

    /// Start sampling `source`; failures fall back to neutral readings
    pub fn spawn_sampler<S>(&mut self, source: S)
    where
        S: SensorSource + 'static,
    {
        let task = run_sampler(
            self.monitor.clone(),
            FallbackSource::new(source),
            self.clock,
            Duration::from_millis(self.config.sample_interval_ms),
            self.shutdown_tx.subscribe(),
        );
        self.tasks.push(tokio::spawn(task));
    }

    /// Start polling backend telemetry
    pub fn spawn_telemetry<F>(&mut self, poller: TelemetryPoller<F>)
    where
        F: TelemetryFetch + Sync + 'static,
    {
        let task = run_telemetry(
            self.monitor.clone(),
            poller,
            Duration::from_millis(self.config.telemetry_interval_ms),
            self.shutdown_tx.subscribe(),
        );
        self.tasks.push(tokio::spawn(task));
    }

    /// Signal every task to stop and wait for them
    pub async fn shutdown(self) {
        info!("Stopping monitor runtime ({} tasks)", self.tasks.len());
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Runtime task ended abnormally: {}", e);
            }
        }
    }
}

fn ticker(period: Duration) -> time::Interval {
    let mut interval = time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Evaluation and hold ticks until shutdown
pub async fn run_ticks(
    monitor: SharedMonitor,
    clock: MonitorClock,
    config: RuntimeConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    info!(
        "Starting tick loop (evaluation {}ms, hold {}ms)",
        config.evaluation_interval_ms, config.hold_tick_ms
    );
    let mut evaluation = ticker(Duration::from_millis(config.evaluation_interval_ms));
    let mut hold = ticker(Duration::from_millis(config.hold_tick_ms));

    loop {
        tokio::select! {
            _ = evaluation.tick() => {
                let now_ms = clock.now_ms();
                let report = monitor.lock().await.evaluate_tick(now_ms);
                debug!(
                    "Tick {}ms: {} ({} notifications)",
                    now_ms,
                    report.analysis.driver_state,
                    report.notifications.len()
                );
            }
            _ = hold.tick() => {
                let now_ms = clock.now_ms();
                monitor.lock().await.hold_tick(now_ms);
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Tick loop stopped");
}

/// Sensor sampling until shutdown
pub async fn run_sampler<S: SensorSource>(
    monitor: SharedMonitor,
    mut source: FallbackSource<S>,
    clock: MonitorClock,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Starting sampler for {}", source.inner().name());
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // a hung source must not hold up shutdown
                let outcome = tokio::select! {
                    outcome = source.next() => outcome,
                    _ = shutdown.changed() => break,
                };
                let now_ms = clock.now_ms();
                let mut guard = monitor.lock().await;
                guard.record_acquisition(&outcome);
                guard.ingest(&outcome.update, now_ms);
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Sampler stopped ({} failures)", source.total_failures());
}

/// Backend telemetry polling until shutdown
pub async fn run_telemetry<F: TelemetryFetch + Sync>(
    monitor: SharedMonitor,
    mut poller: TelemetryPoller<F>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Starting telemetry poller");
    let mut interval = ticker(period);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let reading = tokio::select! {
                    reading = poller.poll() => reading.cloned(),
                    _ = shutdown.changed() => break,
                };
                if let Some(reading) = reading {
                    monitor.lock().await.record_telemetry(reading);
                }
            }
            _ = shutdown.changed() => break,
        }
    }

    info!("Telemetry poller stopped ({} failures)", poller.failures());
}
