use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log format {0:?} (expected text, json or journald)")]
    InvalidFormat(String),

    #[error("invalid log level {expr:?}: {reason}")]
    InvalidLevel { expr: String, reason: String },

    #[error("invalid timezone {0:?} (expected utc or local)")]
    InvalidTimeZone(String),

    #[error("journald is unavailable: {0}")]
    Journald(String),

    #[error("a global logger is already installed")]
    AlreadyInitialized,
}

pub type LoggerResult<T> = Result<T, LoggerError>;
