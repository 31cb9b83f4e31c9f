//! Reverse index between placement selectors and the candidates they select.
//!
//! For each [`CandidateKind`] the store keeps:
//! - selector key → compiled selector and its matched candidate set;
//! - candidate key → labels and the set of selectors matching it.
//!
//! Both directions are views of one match relation and are updated together
//! by every operation. Selectors are keyed by the owning placement, so a placement
//! contributes one selector to each side.
mod side;
mod snapshot;

pub use snapshot::{CandidateDump, IndexSnapshot, SelectorDump, SideSnapshot};

use std::collections::HashSet;

use emc_model::{CandidateKind, Labels, ObjectKey, SelectorSpec};
use tracing::trace;

use crate::{error::CoreError, selector::Selector};
use side::SideIndex;

/// Result of a selector upsert or removal: candidates that entered or left its matched set.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectorChange {
    pub gained: Vec<ObjectKey>,
    pub lost: Vec<ObjectKey>,
}

impl SelectorChange {
    pub fn is_empty(&self) -> bool {
        self.gained.is_empty() && self.lost.is_empty()
    }
}

/// Result of a candidate upsert or removal, in terms of selector keys.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CandidateChange {
    /// Selectors that started matching.
    pub gained: Vec<ObjectKey>,
    /// Selectors that stopped matching (all former matches on removal).
    pub lost: Vec<ObjectKey>,
    /// Selectors that matched before and still match.
    pub retained: Vec<ObjectKey>,
}

impl CandidateChange {
    /// Returns `true` if no selector's match status flipped.
    pub fn is_unflipped(&self) -> bool {
        self.gained.is_empty() && self.lost.is_empty()
    }

    /// Every selector that matched the candidate before or after the change.
    pub fn touched(&self) -> impl Iterator<Item = &ObjectKey> {
        self.gained
            .iter()
            .chain(self.lost.iter())
            .chain(self.retained.iter())
    }
}

/// Reverse index store for both selector kinds.
#[derive(Debug, Default)]
pub struct IndexStore {
    locations: SideIndex,
    endpoints: SideIndex,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn side(&self, kind: CandidateKind) -> &SideIndex {
        match kind {
            CandidateKind::Location => &self.locations,
            CandidateKind::Endpoint => &self.endpoints,
        }
    }

    fn side_mut(&mut self, kind: CandidateKind) -> &mut SideIndex {
        match kind {
            CandidateKind::Location => &mut self.locations,
            CandidateKind::Endpoint => &mut self.endpoints,
        }
    }

    /// Validate `spec` and install it as the `kind` selector for `key`.
    ///
    /// On a validation error the store is left untouched. If the compiled
    /// selector equals the installed one, nothing is re-evaluated.
    pub fn upsert_selector(
        &mut self,
        key: &ObjectKey,
        spec: &SelectorSpec,
        kind: CandidateKind,
    ) -> Result<SelectorChange, CoreError> {
        let selector = Selector::compile(spec)?;
        Ok(self.upsert_compiled(key, selector, kind))
    }

    /// Install an already compiled selector. Infallible.
    pub fn upsert_compiled(
        &mut self,
        key: &ObjectKey,
        selector: Selector,
        kind: CandidateKind,
    ) -> SelectorChange {
        let change = self.side_mut(kind).upsert_selector(key, selector);
        trace!(
            selector = %key,
            kind = kind.as_str(),
            gained = change.gained.len(),
            lost = change.lost.len(),
            "selector upserted"
        );
        change
    }

    /// Drop the selector and all reverse entries pointing at it.
    ///
    /// Returns `None` if no such selector exists.
    pub fn remove_selector(&mut self, key: &ObjectKey, kind: CandidateKind) -> Option<SelectorChange> {
        self.side_mut(kind).remove_selector(key)
    }

    /// Insert or relabel a candidate, re-evaluating every selector of its kind.
    pub fn upsert_candidate(
        &mut self,
        key: &ObjectKey,
        labels: Labels,
        kind: CandidateKind,
    ) -> CandidateChange {
        let change = self.side_mut(kind).upsert_candidate(key, labels);
        trace!(
            candidate = %key,
            kind = kind.as_str(),
            gained = change.gained.len(),
            lost = change.lost.len(),
            "candidate upserted"
        );
        change
    }

    /// Remove a candidate from every selector that matched it.
    ///
    /// Returns `None` if the candidate is unknown.
    pub fn remove_candidate(&mut self, key: &ObjectKey, kind: CandidateKind) -> Option<CandidateChange> {
        self.side_mut(kind).remove_candidate(key)
    }

    /// Installed selector for `key`, if any.
    pub fn selector(&self, key: &ObjectKey, kind: CandidateKind) -> Option<&Selector> {
        self.side(kind).selectors.get(key).map(|e| e.selector.as_ref())
    }

    /// Candidates currently matched by the selector.
    pub fn matched(&self, key: &ObjectKey, kind: CandidateKind) -> Option<&HashSet<ObjectKey>> {
        self.side(kind).selectors.get(key).map(|e| &e.matched)
    }

    /// Selectors currently matching the candidate.
    pub fn matching_selectors(
        &self,
        candidate: &ObjectKey,
        kind: CandidateKind,
    ) -> Option<&HashSet<ObjectKey>> {
        self.side(kind).candidates.get(candidate).map(|c| &c.selected_by)
    }

    /// Labels last recorded for the candidate.
    pub fn labels(&self, candidate: &ObjectKey, kind: CandidateKind) -> Option<&Labels> {
        self.side(kind).candidates.get(candidate).map(|c| &c.labels)
    }

    /// Keys of all selectors of `kind`.
    pub fn selector_keys(&self, kind: CandidateKind) -> impl Iterator<Item = &ObjectKey> {
        self.side(kind).selectors.keys()
    }

    /// `(selectors, candidates)` counts for `kind`.
    pub fn stats(&self, kind: CandidateKind) -> (usize, usize) {
        let side = self.side(kind);
        (side.selectors.len(), side.candidates.len())
    }

    /// Check forward/reverse agreement and evaluator agreement on both sides.
    ///
    /// Cost is `O(selectors × candidates)`; intended for diagnostics and
    /// optional post-apply checking, not the hot path.
    pub fn verify(&self) -> Result<(), CoreError> {
        for kind in CandidateKind::ALL {
            self.side(kind).verify(kind)?;
        }
        Ok(())
    }

    /// Drop every reverse entry of `candidate`, leaving the forward sets stale.
    #[cfg(test)]
    pub(crate) fn drop_reverse_entries(&mut self, candidate: &ObjectKey, kind: CandidateKind) -> bool {
        self.side_mut(kind)
            .candidates
            .get_mut(candidate)
            .map(|c| !std::mem::take(&mut c.selected_by).is_empty())
            .unwrap_or(false)
    }

    /// Read-only dump of the full index.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            locations: SideSnapshot::from_side(&self.locations),
            endpoints: SideSnapshot::from_side(&self.endpoints),
        }
    }
}
