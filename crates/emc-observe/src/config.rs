use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger configuration; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include the event target (module path) in each line.
    pub with_targets: bool,
    /// Colorize text output; ignored unless stderr is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::Utc,
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub(crate) fn ansi(&self) -> bool {
        self.use_color && std::io::stderr().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg: LoggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LoggerConfig::default());
        assert!(cfg.with_targets);
    }

    #[test]
    fn partial_object_overrides_fields() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format": "json", "level": "emc_core=debug,warn", "withTargets": false}"#)
                .unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "emc_core=debug,warn");
        assert!(!cfg.with_targets);
        assert!(cfg.use_color);
        assert_eq!(cfg.tz, LoggerTimeZone::Utc);
    }

    #[test]
    fn invalid_level_fails_the_whole_config() {
        assert!(serde_json::from_str::<LoggerConfig>(r#"{"level": "x=nope"}"#).is_err());
    }
}
