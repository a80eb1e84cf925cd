//! Engine error taxonomy.
//!
//! Every error distinguishes "nothing happened" (safe to retry) from
//! "partial effect occurred" ([`EngineError::Inconsistent`], which requires
//! reconciliation). No operation is retried automatically.

use store::StoreError;
use thiserror::Error;

/// Errors returned by lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Valid identity, insufficient privilege or ownership mismatch.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Duplicate record or illegal state transition; nothing was written.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A required prior state was not reached (e.g. deliver before payment).
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// A multi-write sequence partially succeeded. The message names the
    /// writes that landed; callers must reconcile rather than retry.
    #[error("inconsistent state: {0}")]
    Inconsistent(String),

    /// A boundary payload failed domain validation.
    #[error(transparent)]
    Validation(#[from] domain::DomainError),

    /// The document store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The payment provider failed.
    #[error("payment provider error: {0}")]
    Provider(String),
}

impl EngineError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
