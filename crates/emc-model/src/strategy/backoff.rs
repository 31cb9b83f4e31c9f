use serde::{Deserialize, Serialize};

/// Delay schedule between feed consumer restarts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackoffStrategy {
    pub jitter: super::JitterStrategy,
    /// Delay after a clean exit, if the restart strategy restarts on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_ms: Option<u64>,
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self {
            jitter: super::JitterStrategy::Equal,
            delay_ms: None,
            first_ms: 500,
            max_ms: 30_000,
            factor: 2.0,
        }
    }
}
