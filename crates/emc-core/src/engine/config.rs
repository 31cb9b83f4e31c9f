use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resolver::{CompatHandle, LabelAffinity, PassThrough};

/// Engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Run the full index consistency check after every applied event.
    ///
    /// Quadratic in index size; meant for staging and tests.
    pub verify_after_apply: bool,
    /// Label key for the [`LabelAffinity`] compatibility rule.
    ///
    /// When unset every matched pair is bound.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affinity_label: Option<String>,
}

impl EngineConfig {
    /// Compatibility rule selected by this configuration.
    pub fn compatibility(&self) -> CompatHandle {
        match &self.affinity_label {
            Some(key) => Arc::new(LabelAffinity::new(key.clone())),
            None => Arc::new(PassThrough),
        }
    }
}
