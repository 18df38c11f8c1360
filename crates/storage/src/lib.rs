//! Storage Layer
//!
//! In-memory notification log with repository pattern. Nothing outlives the
//! process.

mod repository;

pub use repository::{NotificationRecord, Repository, DEFAULT_MAX_RECORDS};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
    #[error("Record not found")]
    NotFound,
}
