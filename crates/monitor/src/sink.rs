//! Notification and display sinks
//!
//! Sinks are called while the monitor is locked, so they must return
//! immediately. Anything slow goes behind a channel.

use alerting::{Notification, NotificationKind};
use std::sync::Arc;
use storage::Repository;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{info, warn};

use crate::view::DashboardView;

/// Receives outbound notifications
pub trait NotificationSink: Send {
    fn name(&self) -> &str;

    fn notify(&self, notification: &Notification);
}

/// Receives a fresh dashboard view after every evaluation tick
pub trait DisplaySink: Send {
    fn render(&self, view: &DashboardView);
}

/// Writes everything to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::HighRisk => {
                warn!(
                    "HIGH RISK drowsiness alert at {}ms: {}",
                    notification.at_ms, notification.payload
                );
            }
            _ => {
                info!(
                    "{} at {}ms: {}",
                    notification.kind.as_str(),
                    notification.at_ms,
                    notification.payload
                );
            }
        }
    }
}

impl DisplaySink for LogSink {
    fn render(&self, view: &DashboardView) {
        info!(
            "{} | eyes {:.1}% ({:?}) | head {:.1}/{:.1} ({:?}) | drowsy ticks {}",
            view.status_line(),
            view.eye_closed_percent,
            view.eye_closure_band,
            view.head_pitch_deg,
            view.head_yaw_deg,
            view.head_tilt_band,
            view.escalation.consecutive_drowsy_ticks
        );
    }
}

/// Forwards into a bounded mpsc channel without waiting.
///
/// A full or closed channel drops the item and bumps
/// `dms_notifications_dropped_total`.
pub struct ChannelSink<T> {
    name: String,
    tx: mpsc::Sender<T>,
}

impl<T> ChannelSink<T> {
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<T>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }

    /// Sink plus the receiving half
    pub fn channel(name: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(name, tx), rx)
    }

    fn forward(&self, item: T) {
        match self.tx.try_send(item) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                metrics::counter!("dms_notifications_dropped_total").increment(1);
                warn!("Sink {} is full, dropping item", self.name);
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("dms_notifications_dropped_total").increment(1);
                warn!("Sink {} is closed, dropping item", self.name);
            }
        }
    }
}

impl NotificationSink for ChannelSink<Notification> {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, notification: &Notification) {
        self.forward(notification.clone());
    }
}

impl DisplaySink for ChannelSink<DashboardView> {
    fn render(&self, view: &DashboardView) {
        self.forward(view.clone());
    }
}

/// Persists notifications to the in-memory [`Repository`]
pub struct RepositorySink {
    repo: Arc<Repository>,
}

impl RepositorySink {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }
}

impl NotificationSink for RepositorySink {
    fn name(&self) -> &str {
        "repository"
    }

    fn notify(&self, notification: &Notification) {
        if let Err(e) = self.repo.insert(notification) {
            warn!("Failed to store {} notification: {}", notification.kind.as_str(), e);
        }
    }
}
