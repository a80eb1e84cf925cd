//! Domain error types.

use thiserror::Error;

/// Errors raised while validating domain values at the boundary.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required field was missing, empty, or out of range.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },

    /// A chef identifier did not match the `CHEF-####` format.
    #[error("invalid chef identifier: {0}")]
    InvalidChefId(String),
}

impl DomainError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
