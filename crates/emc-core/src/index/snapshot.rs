use std::collections::{BTreeMap, BTreeSet};

use emc_model::{Labels, ObjectKey};
use serde::Serialize;

use super::side::SideIndex;

/// Dump of one selector: canonical expression and matched candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorDump {
    pub expression: String,
    pub matched: BTreeSet<ObjectKey>,
}

/// Dump of one candidate: labels and the selectors matching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDump {
    pub labels: Labels,
    pub selected_by: BTreeSet<ObjectKey>,
}

/// Dump of one side of the index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SideSnapshot {
    pub selectors: BTreeMap<ObjectKey, SelectorDump>,
    pub candidates: BTreeMap<ObjectKey, CandidateDump>,
}

impl SideSnapshot {
    pub(super) fn from_side(side: &SideIndex) -> Self {
        let selectors = side
            .selectors
            .iter()
            .map(|(k, e)| {
                (
                    k.clone(),
                    SelectorDump {
                        expression: e.selector.to_string(),
                        matched: e.matched.iter().cloned().collect(),
                    },
                )
            })
            .collect();
        let candidates = side
            .candidates
            .iter()
            .map(|(k, c)| {
                (
                    k.clone(),
                    CandidateDump {
                        labels: c.labels.clone(),
                        selected_by: c.selected_by.iter().cloned().collect(),
                    },
                )
            })
            .collect();
        Self {
            selectors,
            candidates,
        }
    }
}

/// Read-only debug snapshot of the whole index.
///
/// Diagnostics only; nothing reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    pub locations: SideSnapshot,
    pub endpoints: SideSnapshot,
}
