use serde::{Deserialize, Serialize};

use crate::SelectorSpec;

/// Placement policy: bind every endpoint matched by `endpoint_selector`
/// to every location matched by `location_selector`.
///
/// Both selectors are identified by the placement's own key; they are created,
/// replaced and deleted together with the placement.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSpec {
    /// Selects candidate locations.
    #[serde(default)]
    pub location_selector: SelectorSpec,
    /// Selects workload endpoints.
    #[serde(default)]
    pub endpoint_selector: SelectorSpec,
}

impl PlacementSpec {
    pub fn new(location_selector: SelectorSpec, endpoint_selector: SelectorSpec) -> Self {
        Self {
            location_selector,
            endpoint_selector,
        }
    }
}
