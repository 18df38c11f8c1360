//! Repository Implementation

use crate::StorageError;
use alerting::{Notification, NotificationKind};
use chrono::{DateTime, Utc};
use dms::DriverState;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Default number of notifications kept
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Stored notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// Monitor clock time of the event
    pub at_ms: u64,
    pub kind: NotificationKind,
    pub driver_state: DriverState,
    pub payload: serde_json::Value,
    pub acknowledged: bool,
}

impl NotificationRecord {
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            at_ms: notification.at_ms,
            kind: notification.kind,
            driver_state: notification.driver_state,
            payload: notification.payload.clone(),
            acknowledged: false,
        }
    }
}

/// In-memory notification repository
pub struct Repository {
    notifications: Mutex<VecDeque<NotificationRecord>>,
    max_records: usize,
}

impl Repository {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }

    pub fn with_capacity(max_records: usize) -> Self {
        info!("Creating in-memory repository (max {} records)", max_records);
        Self {
            notifications: Mutex::new(VecDeque::with_capacity(max_records.min(1024))),
            max_records: max_records.max(1),
        }
    }

    /// Store a notification, evicting the oldest beyond retention
    pub fn insert(&self, notification: &Notification) -> Result<Uuid, StorageError> {
        let record = NotificationRecord::from_notification(notification);
        let id = record.id;
        let mut log = self.lock()?;

        while log.len() >= self.max_records {
            log.pop_front();
        }
        log.push_back(record);
        debug!("Stored {} notification {}", notification.kind.as_str(), id);

        Ok(id)
    }

    /// Most recent notifications first, optionally filtered by kind
    pub fn recent(
        &self,
        kind: Option<NotificationKind>,
        limit: usize,
    ) -> Result<Vec<NotificationRecord>, StorageError> {
        let log = self.lock()?;
        Ok(log
            .iter()
            .rev()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .take(limit)
            .cloned()
            .collect())
    }

    /// Mark a notification acknowledged
    pub fn acknowledge(&self, id: Uuid) -> Result<(), StorageError> {
        let mut log = self.lock()?;
        let record = log
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StorageError::NotFound)?;
        record.acknowledged = true;
        info!("Notification acknowledged: {}", id);
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn unacknowledged_count(&self) -> usize {
        self.notifications
            .lock()
            .map(|l| l.iter().filter(|r| !r.acknowledged).count())
            .unwrap_or(0)
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut log) = self.notifications.lock() {
            log.clear();
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<NotificationRecord>>, StorageError> {
        self.notifications
            .lock()
            .map_err(|e| StorageError::LockPoisoned(e.to_string()))
    }
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(kind: NotificationKind, at_ms: u64) -> Notification {
        Notification {
            kind,
            at_ms,
            driver_state: DriverState::Drowsy,
            payload: json!({ "at": at_ms }),
        }
    }

    #[test]
    fn test_insert_and_recent() {
        let repo = Repository::new();
        repo.insert(&notification(NotificationKind::StatusChanged, 1000)).unwrap();
        repo.insert(&notification(NotificationKind::HighRisk, 4000)).unwrap();

        let all = repo.recent(None, 10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].at_ms, 4000);

        let high = repo.recent(Some(NotificationKind::HighRisk), 10).unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].payload["at"], 4000);
    }

    #[test]
    fn test_acknowledge() {
        let repo = Repository::new();
        let id = repo.insert(&notification(NotificationKind::HighRisk, 0)).unwrap();
        assert_eq!(repo.unacknowledged_count(), 1);

        repo.acknowledge(id).unwrap();
        assert_eq!(repo.unacknowledged_count(), 0);
        assert!(matches!(repo.acknowledge(Uuid::new_v4()), Err(StorageError::NotFound)));
    }

    #[test]
    fn test_retention_limit() {
        let repo = Repository::with_capacity(5);
        for i in 0..10 {
            repo.insert(&notification(NotificationKind::StatusChanged, i)).unwrap();
        }

        assert_eq!(repo.count(), 5);
        assert_eq!(repo.recent(None, 1).unwrap()[0].at_ms, 9);
        repo.clear();
        assert_eq!(repo.count(), 0);
    }
}
