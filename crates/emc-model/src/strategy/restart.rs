use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ModelError, ModelResult};

/// Whether the feed consumer is started again after it exits.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestartStrategy {
    Never,
    Always,
    /// Restart only after a failed run (e.g. an index rebuild was requested).
    #[default]
    OnFailure,
}

impl FromStr for RestartStrategy {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(RestartStrategy::Always),
            "never" | "" => Ok(RestartStrategy::Never),
            "on-failure" | "onfailure" | "failure" => Ok(RestartStrategy::OnFailure),
            other => Err(ModelError::UnknownRestart(other.to_string())),
        }
    }
}
