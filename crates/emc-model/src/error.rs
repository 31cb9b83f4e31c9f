use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("unknown selector operator: {0}")]
    UnknownOperator(String),

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("unknown restart strategy: {0}")]
    UnknownRestart(String),

    #[error("unknown jitter strategy: {0}")]
    UnknownJitter(String),

    #[error("payload does not fit {kind} event: {reason}")]
    PayloadMismatch { kind: &'static str, reason: String },

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
