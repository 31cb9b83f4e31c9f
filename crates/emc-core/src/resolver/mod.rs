//! Binding resolver.
//!
//! For one placement the binding set is the cross product of the endpoints its
//! endpoint selector matches and the locations its location selector matches,
//! filtered by a [`Compatibility`] rule. The resolver remembers the last set it
//! emitted per placement and reports only the difference.
mod compat;
pub use compat::{CandidateRef, CompatHandle, Compatibility, LabelAffinity, PassThrough};

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use emc_model::{Binding, BindingDelta, CandidateKind, ObjectKey};
use tracing::debug;

use crate::index::IndexStore;

pub struct BindingResolver {
    compat: CompatHandle,
    emitted: HashMap<ObjectKey, BTreeSet<Binding>>,
}

impl BindingResolver {
    pub fn new(compat: CompatHandle) -> Self {
        Self {
            compat,
            emitted: HashMap::new(),
        }
    }

    /// Bindings the placement would have given the current index, without recording them.
    ///
    /// A placement missing either selector has no bindings.
    pub fn compute(&self, placement: &ObjectKey, index: &IndexStore) -> BTreeSet<Binding> {
        let (Some(endpoints), Some(locations)) = (
            index.matched(placement, CandidateKind::Endpoint),
            index.matched(placement, CandidateKind::Location),
        ) else {
            return BTreeSet::new();
        };

        let mut out = BTreeSet::new();
        for ep in endpoints {
            let Some(ep_labels) = index.labels(ep, CandidateKind::Endpoint) else {
                continue;
            };
            for loc in locations {
                let Some(loc_labels) = index.labels(loc, CandidateKind::Location) else {
                    continue;
                };
                let admitted = self.compat.admits(
                    placement,
                    CandidateRef {
                        key: ep,
                        labels: ep_labels,
                    },
                    CandidateRef {
                        key: loc,
                        labels: loc_labels,
                    },
                );
                if admitted {
                    out.insert(Binding::new(ep.clone(), loc.clone()));
                }
            }
        }
        out
    }

    /// Recompute one placement and return what changed since the last call.
    pub fn resolve(&mut self, placement: &ObjectKey, index: &IndexStore) -> BindingDelta {
        let current = self.compute(placement, index);
        let previous = self.emitted.remove(placement).unwrap_or_default();

        let delta = BindingDelta {
            placement: placement.clone(),
            removed: previous.difference(&current).cloned().collect(),
            added: current.difference(&previous).cloned().collect(),
        };

        if !current.is_empty() {
            self.emitted.insert(placement.clone(), current);
        }
        if !delta.is_empty() {
            debug!(
                placement = %placement,
                removed = delta.removed.len(),
                added = delta.added.len(),
                compat = self.compat.name(),
                "bindings changed"
            );
        }
        delta
    }

    /// Resolve several placements in key order, dropping empty deltas.
    pub fn resolve_all<'a, I>(&mut self, placements: I, index: &IndexStore) -> Vec<BindingDelta>
    where
        I: IntoIterator<Item = &'a ObjectKey>,
    {
        let ordered: BTreeSet<&ObjectKey> = placements.into_iter().collect();
        ordered
            .into_iter()
            .map(|p| self.resolve(p, index))
            .filter(|d| !d.is_empty())
            .collect()
    }

    /// Last emitted bindings of a placement.
    pub fn bindings(&self, placement: &ObjectKey) -> Option<&BTreeSet<Binding>> {
        self.emitted.get(placement)
    }

    /// Placements with at least one emitted binding.
    pub fn placements(&self) -> impl Iterator<Item = &ObjectKey> {
        self.emitted.keys()
    }

    /// Sorted copy of every emitted binding set.
    pub fn all_bindings(&self) -> BTreeMap<ObjectKey, BTreeSet<Binding>> {
        self.emitted
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn compatibility(&self) -> &CompatHandle {
        &self.compat
    }
}

impl Default for BindingResolver {
    fn default() -> Self {
        Self::new(Arc::new(PassThrough))
    }
}

impl fmt::Debug for BindingResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingResolver")
            .field("compat", &self.compat.name())
            .field("placements", &self.emitted.len())
            .finish()
    }
}
