use thiserror::Error;

use emc_model::{ObjectKey, ResourceKind, ResourceVersion};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{kind} {key} not found")]
    NotFound { kind: ResourceKind, key: ObjectKey },

    #[error("stale {kind} event for {key}: version {got} is not newer than {stored}")]
    Stale {
        kind: ResourceKind,
        key: ObjectKey,
        stored: ResourceVersion,
        got: ResourceVersion,
    },

    #[error("index invariant violated: {0}")]
    InvariantViolation(String),

    #[error("supervisor error: {0}")]
    Supervisor(String),

    #[error("resync source error: {0}")]
    Source(String),
}

impl CoreError {
    /// Returns `true` for errors that mean the index can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::InvariantViolation(_))
    }
}
