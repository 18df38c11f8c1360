//! Validation Error Types

use thiserror::Error;

/// Problems found while validating a snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range (clamped)
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// NaN or infinite value (replaced with the neutral value)
    #[error("{field} is not a finite number")]
    NotFinite { field: &'static str },

    /// Configured range is empty or not finite
    #[error("{field} range [{min}, {max}] is invalid")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
}
