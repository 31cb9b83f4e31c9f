//! Logging setup for emc binaries.
//!
//! [`init_logger`] installs a global `tracing` subscriber described by a
//! [`LoggerConfig`]: text or JSON lines on stderr, or systemd-journald.
mod clock;
mod config;
mod error;
mod format;
mod install;
mod level;

pub use clock::{LoggerTimeZone, Rfc3339Timer};
pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;

/// Install the global subscriber.
///
/// With [`LoggerTimeZone::Local`] the offset is detected here, so call this
/// before any runtime threads are spawned; detection fails in a
/// multi-threaded process on most Unix platforms and falls back to UTC.
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    let timer = Rfc3339Timer::new(cfg.tz);
    match cfg.format {
        LoggerFormat::Text => install::text(cfg, timer),
        LoggerFormat::Json => install::json(cfg, timer),
        LoggerFormat::Journald => install::journald(cfg),
    }
}
