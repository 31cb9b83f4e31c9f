use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::LoggerError;

/// Validated `EnvFilter` directive string, e.g. `"info"` or `"emc_core=debug,info"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(expr: impl Into<String>) -> Result<Self, LoggerError> {
        let expr = expr.into();
        Self::filter(&expr)?;
        Ok(Self(expr))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build the filter for the subscriber.
    pub fn to_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        Self::filter(&self.0)
    }

    fn filter(expr: &str) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(expr).map_err(|e| LoggerError::InvalidLevel {
            expr: expr.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LoggerLevel {
    type Error = LoggerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LoggerLevel> for String {
    fn from(l: LoggerLevel) -> Self {
        l.0
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_directives() {
        for expr in ["info", "trace", "emc_core=debug,info", "emc_core::engine=trace,warn"] {
            let lvl: LoggerLevel = expr.parse().unwrap();
            assert_eq!(lvl.as_str(), expr);
            assert!(lvl.to_env_filter().is_ok());
        }
    }

    #[test]
    fn rejects_bad_levels() {
        for expr in ["emc_core=loud", "a=trace,b=wat"] {
            let err = expr.parse::<LoggerLevel>().unwrap_err();
            assert!(matches!(err, LoggerError::InvalidLevel { .. }), "{expr}");
        }
    }

    #[test]
    fn default_level_is_info() {
        let lvl = LoggerLevel::default();
        assert_eq!(lvl.as_str(), "info");
        assert!(lvl.to_env_filter().is_ok());
    }

    #[test]
    fn deserializes_from_plain_string() {
        let lvl: LoggerLevel = serde_json::from_str(r#""debug""#).unwrap();
        assert_eq!(lvl.to_string(), "debug");
        assert!(serde_json::from_str::<LoggerLevel>(r#""x=nope""#).is_err());
    }
}
