use serde::{Deserialize, Serialize};

use super::{BackoffStrategy, RestartStrategy};

/// Supervision policy for the change-feed consumer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedPolicy {
    /// Task name used in supervisor events and logs.
    pub name: String,
    pub restart: RestartStrategy,
    pub backoff: BackoffStrategy,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            name: "emc-change-feed".to_string(),
            restart: RestartStrategy::OnFailure,
            backoff: BackoffStrategy::default(),
        }
    }
}
