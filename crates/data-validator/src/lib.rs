//! Signal Validation
//!
//! Range checking for driver signal snapshots. Out-of-range values are
//! clamped into the valid range rather than rejected, so evaluation always
//! has something to work with.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Sanitized, ValidationConfig, Validator};
