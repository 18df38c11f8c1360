//! Driver monitor: ingest → evaluate → escalate → sinks

use alerting::{AlertConfig, AlertManager, Notification, NotificationKind};
use controls::{
    PedalConfig, PedalContext, PedalControl, SeatbeltClassification, SeatbeltMonitor,
    DEFAULT_HOLD_MS,
};
use data_validator::{ValidationConfig, Validator};
use dms::{
    DmsAnalysis, DmsConfig, DriverState, DrowsinessEvaluator, TelemetryMetrics,
    TelemetryReading, TelemetryRules,
};
use sensor_source::SampleOutcome;
use serde::{Deserialize, Serialize};
use signal_buffer::{SensorChannel, SensorUpdate, SignalBuffer, SignalSnapshot};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::sink::{DisplaySink, NotificationSink};
use crate::view::{AcquisitionStatus, DashboardView, SeatbeltView};
use crate::MonitorError;

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub dms: DmsConfig,
    pub alerts: AlertConfig,
    pub validation: ValidationConfig,
    pub pedals: PedalConfig,
    /// Seatbelt evaluation window (milliseconds)
    pub seatbelt_window_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            dms: DmsConfig::default(),
            alerts: AlertConfig::default(),
            validation: ValidationConfig::default(),
            pedals: PedalConfig::default(),
            seatbelt_window_ms: DEFAULT_HOLD_MS,
        }
    }
}

/// Manual controls exposed to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Control {
    Accelerator,
    Brake,
    Seatbelt,
}

impl Control {
    pub fn as_str(self) -> &'static str {
        match self {
            Control::Accelerator => "accelerator",
            Control::Brake => "brake",
            Control::Seatbelt => "seatbelt",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Control {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "accelerator" => Ok(Control::Accelerator),
            "brake" => Ok(Control::Brake),
            "seatbelt" => Ok(Control::Seatbelt),
            other => Err(MonitorError::UnknownControl(other.to_string())),
        }
    }
}

/// Control state after a press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlOutcome {
    pub control: Control,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<SeatbeltClassification>,
}

/// Result of one evaluation tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub analysis: DmsAnalysis,
    pub notifications: Vec<Notification>,
}

/// Owns every piece of mutable monitoring state.
///
/// All mutation goes through `&mut self`, so callers serialize ticks and
/// input events by holding a single lock around the monitor.
pub struct DriverMonitor {
    buffer: SignalBuffer,
    validator: Validator,
    evaluator: DrowsinessEvaluator,
    telemetry_rules: TelemetryRules,
    alerts: AlertManager,
    accelerator: PedalControl,
    brake: PedalControl,
    seatbelt: SeatbeltMonitor,
    notification_sinks: Vec<Box<dyn NotificationSink>>,
    display_sinks: Vec<Box<dyn DisplaySink>>,
    acquisition: AcquisitionStatus,
    telemetry: Option<TelemetryReading>,
    backend_state: Option<DriverState>,
    last_view: Option<DashboardView>,
    evaluations: u64,
}

impl DriverMonitor {
    pub fn new(config: MonitorConfig) -> Result<Self, MonitorError> {
        config.dms.validate()?;
        config.validation.validate()?;
        info!(
            "Creating driver monitor (seatbelt window {}ms, pedal delay {}ms)",
            config.seatbelt_window_ms, config.pedals.deactivation_delay_ms
        );

        Ok(Self {
            buffer: SignalBuffer::new(),
            validator: Validator::new(config.validation),
            telemetry_rules: TelemetryRules::new(&config.dms),
            evaluator: DrowsinessEvaluator::new(config.dms),
            alerts: AlertManager::new(config.alerts),
            accelerator: PedalControl::new("accelerator", &config.pedals),
            brake: PedalControl::new("brake", &config.pedals),
            seatbelt: SeatbeltMonitor::new(config.seatbelt_window_ms),
            notification_sinks: Vec::new(),
            display_sinks: Vec::new(),
            acquisition: AcquisitionStatus::default(),
            telemetry: None,
            backend_state: None,
            last_view: None,
            evaluations: 0,
        })
    }

    pub fn add_notification_sink(&mut self, sink: Box<dyn NotificationSink>) {
        debug!("Registered notification sink {}", sink.name());
        self.notification_sinks.push(sink);
    }

    pub fn add_display_sink(&mut self, sink: Box<dyn DisplaySink>) {
        self.display_sinks.push(sink);
    }

    /// Write a sensor update into the buffer. A seatbelt reading also drives
    /// the seatbelt hold.
    pub fn ingest(&mut self, update: &SensorUpdate, now_ms: u64) {
        self.buffer.apply(update, now_ms);

        match update.seatbelt_pressed {
            Some(true) => {
                self.seatbelt.press(now_ms);
            }
            Some(false) => {
                self.release_seatbelt(now_ms);
            }
            None => {}
        }
    }

    /// Record how the last acquisition attempt went
    pub fn record_acquisition(&mut self, outcome: &SampleOutcome) {
        if outcome.degraded {
            self.acquisition.available = false;
            self.acquisition.retryable = true;
            self.acquisition.consecutive_failures += 1;
            self.acquisition.last_error = outcome.error.as_ref().map(|e| e.to_string());
        } else if !self.acquisition.available {
            info!("Sensor acquisition restored");
            self.acquisition = AcquisitionStatus::default();
        }
    }

    /// Store the latest backend telemetry and run the backend rules on it
    pub fn record_telemetry(&mut self, reading: TelemetryReading) {
        let metrics = TelemetryMetrics {
            seatbelt_suspicious: self.seatbelt.last_classification()
                == Some(SeatbeltClassification::Suspicious),
            ..TelemetryMetrics::from(&reading)
        };
        let state = self.telemetry_rules.determine_state(&metrics);
        if self.backend_state != Some(state) {
            debug!("Backend telemetry state: {}", state);
        }
        self.backend_state = Some(state);
        self.telemetry = Some(reading);
    }

    pub fn press(&mut self, control: Control, now_ms: u64) -> ControlOutcome {
        match control {
            Control::Accelerator => self.accelerator.press(now_ms),
            Control::Brake => self.brake.press(now_ms),
            Control::Seatbelt => {
                self.buffer.set(SensorChannel::SeatbeltPressure, true, now_ms);
                self.seatbelt.press(now_ms);
            }
        }
        self.outcome(control, None, now_ms)
    }

    pub fn release(&mut self, control: Control, now_ms: u64) -> ControlOutcome {
        let classification = match control {
            Control::Accelerator => {
                self.accelerator.release(now_ms);
                None
            }
            Control::Brake => {
                self.brake.release(now_ms);
                None
            }
            Control::Seatbelt => {
                self.buffer.set(SensorChannel::SeatbeltPressure, false, now_ms);
                self.release_seatbelt(now_ms)
            }
        };
        self.outcome(control, classification, now_ms)
    }

    /// Fast tick: advance the seatbelt window
    pub fn hold_tick(&mut self, now_ms: u64) -> Option<SeatbeltClassification> {
        if !self.seatbelt.is_holding() {
            return None;
        }

        let context = self.pedal_context(now_ms);
        let result = self.seatbelt.tick(now_ms, context);
        if let Some(classification) = result {
            self.publish_seatbelt(classification, now_ms);
        }

        let seatbelt = self.seatbelt_view(now_ms);
        if let Some(view) = self.last_view.as_mut() {
            view.seatbelt = seatbelt;
        }
        result
    }

    /// Evaluation tick: snapshot, sanitize, evaluate, escalate, dispatch
    pub fn evaluate_tick(&mut self, now_ms: u64) -> TickReport {
        let sanitized = self.validator.sanitize(self.effective_snapshot(now_ms));
        if !sanitized.was_valid() {
            debug!("Evaluating clamped snapshot ({} fixes)", sanitized.errors.len());
        }

        let analysis = self.evaluator.assess(&sanitized.snapshot);
        let notifications = self.alerts.process(analysis.driver_state, now_ms);

        metrics::counter!("dms_evaluations_total").increment(1);
        metrics::gauge!("dms_consecutive_drowsy_ticks")
            .set(self.alerts.escalation_state().consecutive_drowsy_ticks as f64);

        for notification in &notifications {
            self.dispatch(notification);
        }

        let view = self.build_view(&sanitized.snapshot, &analysis, now_ms);
        for sink in &self.display_sinks {
            sink.render(&view);
        }
        self.last_view = Some(view);
        self.evaluations += 1;

        TickReport {
            analysis,
            notifications,
        }
    }

    /// Most recent dashboard view (None before the first evaluation)
    pub fn last_view(&self) -> Option<&DashboardView> {
        self.last_view.as_ref()
    }

    /// Current evaluated driver state
    pub fn driver_state(&self) -> DriverState {
        self.last_view
            .as_ref()
            .map(|v| v.driver_state)
            .unwrap_or_default()
    }

    /// Legacy telemetry shape: `{ear, blink_rate, yawn_detected, driver_state}`
    pub fn telemetry_reading(&self) -> TelemetryReading {
        let backend = self.telemetry.clone().unwrap_or_default();
        let yawning = self.last_view.as_ref().map_or(false, |v| v.is_yawning);
        TelemetryReading {
            yawn_detected: backend.yawn_detected || yawning,
            driver_state: self.driver_state(),
            ..backend
        }
    }

    pub fn acquisition(&self) -> &AcquisitionStatus {
        &self.acquisition
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    /// Forget the current driver: signals, escalation, and debounce state
    pub fn reset(&mut self) {
        info!("Resetting driver monitor");
        self.buffer.clear();
        self.alerts.reset();
        self.last_view = None;
        self.telemetry = None;
        self.backend_state = None;
    }

    fn effective_snapshot(&self, now_ms: u64) -> SignalSnapshot {
        let mut snapshot = self.buffer.snapshot();
        snapshot.accelerator_active |= self.accelerator.is_active(now_ms);
        snapshot.brake_active |= self.brake.is_active(now_ms);
        snapshot.seatbelt_pressed |= self.seatbelt.is_holding();
        snapshot
    }

    fn pedal_context(&self, now_ms: u64) -> PedalContext {
        let snapshot = self.effective_snapshot(now_ms);
        PedalContext {
            accelerator_active: snapshot.accelerator_active,
            brake_active: snapshot.brake_active,
        }
    }

    fn release_seatbelt(&mut self, now_ms: u64) -> Option<SeatbeltClassification> {
        let result = self.seatbelt.release(now_ms);
        if let Some(classification) = result {
            self.publish_seatbelt(classification, now_ms);
        }
        result
    }

    fn publish_seatbelt(&mut self, classification: SeatbeltClassification, now_ms: u64) {
        let notification =
            self.alerts
                .seatbelt_notification(classification, self.driver_state(), now_ms);
        self.dispatch(&notification);
    }

    fn dispatch(&self, notification: &Notification) {
        if notification.kind == NotificationKind::HighRisk {
            metrics::counter!("dms_high_risk_alerts_total").increment(1);
            warn!("High risk drowsiness alert raised at {}ms", notification.at_ms);
        }
        for sink in &self.notification_sinks {
            sink.notify(notification);
        }
    }

    fn outcome(
        &self,
        control: Control,
        classification: Option<SeatbeltClassification>,
        now_ms: u64,
    ) -> ControlOutcome {
        let active = match control {
            Control::Accelerator => self.accelerator.is_active(now_ms),
            Control::Brake => self.brake.is_active(now_ms),
            Control::Seatbelt => self.seatbelt.is_holding(),
        };
        ControlOutcome {
            control,
            active,
            classification,
        }
    }

    fn seatbelt_view(&self, now_ms: u64) -> SeatbeltView {
        let classification = self.seatbelt.last_classification();
        SeatbeltView {
            holding: self.seatbelt.is_holding(),
            progress_percent: self.seatbelt.progress_percent(now_ms),
            classification,
            label: classification.map(|c| c.label().to_string()),
        }
    }

    fn build_view(
        &self,
        snapshot: &SignalSnapshot,
        analysis: &DmsAnalysis,
        now_ms: u64,
    ) -> DashboardView {
        DashboardView {
            escalation: self.alerts.escalation_state(),
            high_risk_alerts: self.alerts.high_risk_count(),
            seatbelt: self.seatbelt_view(now_ms),
            sensor: self.acquisition.clone(),
            telemetry: self.telemetry.clone(),
            backend_state: self.backend_state,
            ..DashboardView::from_analysis(snapshot, analysis, now_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use sensor_source::AcquisitionError;
    use tokio::sync::mpsc;

    fn monitor_with_sink() -> (DriverMonitor, mpsc::Receiver<Notification>) {
        let mut monitor = DriverMonitor::new(MonitorConfig::default()).unwrap();
        let (sink, rx) = ChannelSink::<Notification>::channel("test", 64);
        monitor.add_notification_sink(Box::new(sink));
        (monitor, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }

    fn count(notifications: &[Notification], kind: NotificationKind) -> usize {
        notifications.iter().filter(|n| n.kind == kind).count()
    }

    #[test]
    fn test_first_tick_publishes_initial_status() {
        let (mut monitor, mut rx) = monitor_with_sink();
        monitor.ingest(&SensorUpdate::face_metrics(2.0, false, 1.0, -1.0), 0);
        let report = monitor.evaluate_tick(1000);

        assert_eq!(report.analysis.driver_state, DriverState::Normal);
        let sent = drain(&mut rx);
        assert_eq!(count(&sent, NotificationKind::StatusChanged), 1);
        assert_eq!(monitor.evaluations(), 1);
    }

    #[test]
    fn test_sustained_drowsiness_alerts_once() {
        let (mut monitor, mut rx) = monitor_with_sink();
        monitor.ingest(&SensorUpdate::face_metrics(40.0, false, 0.0, 0.0), 0);

        for tick in 1..=8 {
            monitor.evaluate_tick(tick * 1000);
        }

        let sent = drain(&mut rx);
        assert_eq!(count(&sent, NotificationKind::HighRisk), 1);
        let high = sent
            .iter()
            .find(|n| n.kind == NotificationKind::HighRisk)
            .unwrap();
        assert_eq!(high.at_ms, 4000);
        assert_eq!(monitor.last_view().unwrap().high_risk_alerts, 1);
    }

    #[test]
    fn test_recovery_rearms_escalation() {
        let (mut monitor, mut rx) = monitor_with_sink();
        let drowsy = SensorUpdate::face_metrics(40.0, false, 0.0, 0.0);
        let calm = SensorUpdate::face_metrics(1.0, false, 0.0, 0.0);

        let mut now = 0;
        for update in [&drowsy, &calm, &drowsy] {
            monitor.ingest(update, now);
            for _ in 0..5 {
                now += 1000;
                monitor.evaluate_tick(now);
            }
        }

        assert_eq!(count(&drain(&mut rx), NotificationKind::HighRisk), 2);
    }

    #[test]
    fn test_out_of_range_input_is_clamped() {
        let (mut monitor, _rx) = monitor_with_sink();
        monitor.ingest(&SensorUpdate::face_metrics(150.0, false, 0.0, -200.0), 0);
        monitor.evaluate_tick(1000);

        let view = monitor.last_view().unwrap();
        assert_eq!(view.eye_closed_percent, 100.0);
        assert_eq!(view.head_yaw_deg, -90.0);
        assert_eq!(view.driver_state, DriverState::Drowsy);
    }

    #[test]
    fn test_inverted_validation_range_rejected() {
        let result = DriverMonitor::new(MonitorConfig {
            validation: ValidationConfig {
                eye_closed_range: (100.0, 0.0),
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(matches!(result, Err(MonitorError::Validation(_))));

        let result = DriverMonitor::new(MonitorConfig {
            validation: ValidationConfig {
                head_pitch_range: (f32::NAN, 90.0),
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_display_sink_gets_one_view_per_tick() {
        let (mut monitor, _rx) = monitor_with_sink();
        let (display, mut views) = ChannelSink::<DashboardView>::channel("display", 16);
        monitor.add_display_sink(Box::new(display));

        monitor.ingest(&SensorUpdate::face_metrics(40.0, false, 0.0, 0.0), 0);
        monitor.press(Control::Seatbelt, 0);
        for tick in 1..=5 {
            monitor.evaluate_tick(tick * 1000);
        }

        let mut received = Vec::new();
        while let Ok(view) = views.try_recv() {
            received.push(view);
        }
        assert_eq!(received.len(), 5);

        for (i, view) in received.iter().enumerate() {
            let tick = i as u32 + 1;
            assert_eq!(view.at_ms, u64::from(tick) * 1000);
            assert_eq!(view.driver_state, DriverState::Drowsy);
            assert_eq!(view.escalation.consecutive_drowsy_ticks, tick);
            assert_eq!(view.escalation.alert_already_sent, tick > 3);
            assert!(view.seatbelt.holding);
            assert!((view.seatbelt.progress_percent - tick as f32 * 20.0).abs() < 0.01);
            assert_eq!(view.seatbelt.classification, None);
        }
        assert_eq!(received[4].high_risk_alerts, 1);
        assert_eq!(received[4].eye_closed_percent, 40.0);
    }

    #[test]
    fn test_seatbelt_without_pedals_is_suspicious() {
        let (mut monitor, mut rx) = monitor_with_sink();
        monitor.press(Control::Seatbelt, 0);

        let mut result = None;
        let mut now = 0;
        while result.is_none() && now <= 6000 {
            now += 50;
            result = monitor.hold_tick(now);
        }
        assert_eq!(result, Some(SeatbeltClassification::Suspicious));
        assert_eq!(now, 5000);

        let outcome = monitor.release(Control::Seatbelt, 5200);
        assert_eq!(outcome.classification, None);

        let sent = drain(&mut rx);
        assert_eq!(count(&sent, NotificationKind::SeatbeltClassified), 1);
        assert_eq!(sent[0].payload["suspicious"], true);
    }

    #[test]
    fn test_brake_release_grace_counts_at_window_close() {
        let (mut monitor, _rx) = monitor_with_sink();
        monitor.press(Control::Brake, 0);
        monitor.press(Control::Seatbelt, 0);
        monitor.release(Control::Brake, 4000);

        assert!(monitor.release(Control::Brake, 4000).active);
        assert_eq!(monitor.hold_tick(5000), Some(SeatbeltClassification::NormalBrake));
    }

    #[test]
    fn test_accelerator_from_ingestion() {
        let (mut monitor, _rx) = monitor_with_sink();
        monitor.ingest(
            &SensorUpdate {
                accelerator_active: Some(true),
                seatbelt_pressed: Some(true),
                ..Default::default()
            },
            0,
        );
        assert_eq!(monitor.hold_tick(5000), Some(SeatbeltClassification::Normal));
    }

    #[test]
    fn test_early_seatbelt_release_is_improper() {
        let (mut monitor, mut rx) = monitor_with_sink();
        monitor.press(Control::Seatbelt, 0);
        monitor.hold_tick(1000);

        let outcome = monitor.release(Control::Seatbelt, 1500);
        assert_eq!(outcome.classification, Some(SeatbeltClassification::Improper));
        assert!(!outcome.active);
        assert_eq!(count(&drain(&mut rx), NotificationKind::SeatbeltClassified), 1);
    }

    #[test]
    fn test_acquisition_failure_shows_in_view() {
        let (mut monitor, _rx) = monitor_with_sink();
        monitor.record_acquisition(&SampleOutcome {
            update: SensorUpdate::neutral(),
            degraded: true,
            error: Some(AcquisitionError::Unavailable("permission denied".into())),
        });
        monitor.ingest(&SensorUpdate::neutral(), 0);
        monitor.evaluate_tick(1000);

        let sensor = &monitor.last_view().unwrap().sensor;
        assert!(!sensor.available);
        assert!(sensor.retryable);
        assert_eq!(sensor.consecutive_failures, 1);

        monitor.record_acquisition(&SampleOutcome {
            update: SensorUpdate::neutral(),
            degraded: false,
            error: None,
        });
        assert!(monitor.acquisition().available);
    }

    #[test]
    fn test_telemetry_backend_rules() {
        let (mut monitor, _rx) = monitor_with_sink();
        monitor.record_telemetry(TelemetryReading {
            ear: 0.22,
            blink_rate: 20,
            yawn_detected: false,
            driver_state: DriverState::Normal,
        });
        monitor.evaluate_tick(1000);

        let view = monitor.last_view().unwrap();
        assert_eq!(view.backend_state, Some(DriverState::Drowsy));
        assert_eq!(monitor.telemetry_reading().blink_rate, 20);
        assert_eq!(monitor.telemetry_reading().driver_state, DriverState::Normal);
    }

    #[test]
    fn test_reset_forgets_driver() {
        let (mut monitor, _rx) = monitor_with_sink();
        monitor.ingest(&SensorUpdate::face_metrics(40.0, true, 0.0, 0.0), 0);
        monitor.evaluate_tick(1000);
        monitor.reset();

        assert!(monitor.last_view().is_none());
        assert_eq!(monitor.driver_state(), DriverState::Normal);
        assert_eq!(monitor.alerts().last_published(), None);
    }

    #[test]
    fn test_control_from_str() {
        assert_eq!("Brake".parse::<Control>().unwrap(), Control::Brake);
        assert!(matches!(
            "horn".parse::<Control>(),
            Err(MonitorError::UnknownControl(_))
        ));
    }
}
