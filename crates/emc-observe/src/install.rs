use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    clock::Rfc3339Timer,
    config::LoggerConfig,
    error::{LoggerError, LoggerResult},
};

/// Stdout carries the delta stream, so log lines go to stderr.
pub(crate) fn text(cfg: &LoggerConfig, timer: Rfc3339Timer) -> LoggerResult<()> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg.ansi())
        .with_target(cfg.with_targets)
        .with_timer(timer);

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()?).with(layer))
}

pub(crate) fn json(cfg: &LoggerConfig, timer: Rfc3339Timer) -> LoggerResult<()> {
    let layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_timer(timer);

    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()?).with(layer))
}

#[cfg(target_os = "linux")]
pub(crate) fn journald(cfg: &LoggerConfig) -> LoggerResult<()> {
    let layer = tracing_journald::layer().map_err(|e| LoggerError::Journald(e.to_string()))?;
    install(tracing_subscriber::registry().with(cfg.level.to_env_filter()?).with(layer))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn journald(_cfg: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::Journald("only supported on Linux".into()))
}

fn install<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use crate::{LoggerConfig, LoggerError, init_logger};

    // Only one global subscriber per test binary.
    #[test]
    fn second_install_is_rejected() {
        let cfg = LoggerConfig {
            use_color: false,
            ..LoggerConfig::default()
        };
        let first = init_logger(&cfg);
        let second = init_logger(&cfg);
        assert!(first.is_ok() || matches!(first, Err(LoggerError::AlreadyInitialized)));
        assert!(matches!(second, Err(LoggerError::AlreadyInitialized)));
    }
}
