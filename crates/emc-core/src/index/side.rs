//! One side of the reverse index: selectors of a single kind and the
//! candidates they select over.
//!
//! The forward sets (`SelectorEntry::matched`) and reverse sets
//! (`CandidateEntry::selected_by`) are only ever mutated together, by symmetric
//! difference against the previous state.
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use emc_model::{CandidateKind, Labels, ObjectKey};

use super::{CandidateChange, SelectorChange};
use crate::{error::CoreError, selector::Selector};

#[derive(Debug)]
pub(super) struct SelectorEntry {
    pub(super) selector: Arc<Selector>,
    pub(super) matched: HashSet<ObjectKey>,
}

#[derive(Debug)]
pub(super) struct CandidateEntry {
    pub(super) labels: Labels,
    pub(super) selected_by: HashSet<ObjectKey>,
}

#[derive(Debug, Default)]
pub(super) struct SideIndex {
    pub(super) selectors: HashMap<ObjectKey, SelectorEntry>,
    pub(super) candidates: HashMap<ObjectKey, CandidateEntry>,
}

impl SideIndex {
    pub(super) fn upsert_selector(&mut self, key: &ObjectKey, selector: Selector) -> SelectorChange {
        if let Some(entry) = self.selectors.get(key) {
            if *entry.selector == selector {
                return SelectorChange::default();
            }
        }

        let matched: HashSet<ObjectKey> = self
            .candidates
            .iter()
            .filter(|(_, c)| selector.matches(&c.labels))
            .map(|(k, _)| k.clone())
            .collect();
        let previous = self
            .selectors
            .remove(key)
            .map(|e| e.matched)
            .unwrap_or_default();

        let mut gained: Vec<ObjectKey> = matched.difference(&previous).cloned().collect();
        let mut lost: Vec<ObjectKey> = previous.difference(&matched).cloned().collect();

        for c in &gained {
            if let Some(entry) = self.candidates.get_mut(c) {
                entry.selected_by.insert(key.clone());
            }
        }
        for c in &lost {
            if let Some(entry) = self.candidates.get_mut(c) {
                entry.selected_by.remove(key);
            }
        }

        self.selectors.insert(
            key.clone(),
            SelectorEntry {
                selector: Arc::new(selector),
                matched,
            },
        );

        gained.sort();
        lost.sort();
        SelectorChange { gained, lost }
    }

    pub(super) fn remove_selector(&mut self, key: &ObjectKey) -> Option<SelectorChange> {
        let entry = self.selectors.remove(key)?;
        for c in &entry.matched {
            if let Some(cand) = self.candidates.get_mut(c) {
                cand.selected_by.remove(key);
            }
        }

        let mut lost: Vec<ObjectKey> = entry.matched.into_iter().collect();
        lost.sort();
        Some(SelectorChange {
            gained: Vec::new(),
            lost,
        })
    }

    pub(super) fn upsert_candidate(&mut self, key: &ObjectKey, labels: Labels) -> CandidateChange {
        let previous = self
            .candidates
            .remove(key)
            .map(|c| c.selected_by)
            .unwrap_or_default();

        // Every live selector is evaluated; the evaluator alone decides relevance.
        let selected_by: HashSet<ObjectKey> = self
            .selectors
            .iter()
            .filter(|(_, s)| s.selector.matches(&labels))
            .map(|(k, _)| k.clone())
            .collect();

        let mut gained: Vec<ObjectKey> = selected_by.difference(&previous).cloned().collect();
        let mut lost: Vec<ObjectKey> = previous.difference(&selected_by).cloned().collect();
        let mut retained: Vec<ObjectKey> = selected_by.intersection(&previous).cloned().collect();

        for s in &gained {
            if let Some(entry) = self.selectors.get_mut(s) {
                entry.matched.insert(key.clone());
            }
        }
        for s in &lost {
            if let Some(entry) = self.selectors.get_mut(s) {
                entry.matched.remove(key);
            }
        }

        self.candidates.insert(
            key.clone(),
            CandidateEntry {
                labels,
                selected_by,
            },
        );

        gained.sort();
        lost.sort();
        retained.sort();
        CandidateChange {
            gained,
            lost,
            retained,
        }
    }

    pub(super) fn remove_candidate(&mut self, key: &ObjectKey) -> Option<CandidateChange> {
        let entry = self.candidates.remove(key)?;
        for s in &entry.selected_by {
            if let Some(sel) = self.selectors.get_mut(s) {
                sel.matched.remove(key);
            }
        }

        let mut lost: Vec<ObjectKey> = entry.selected_by.into_iter().collect();
        lost.sort();
        Some(CandidateChange {
            gained: Vec::new(),
            lost,
            retained: Vec::new(),
        })
    }

    /// Full consistency check of this side.
    ///
    /// Checks that both views agree with each other and with the evaluator.
    pub(super) fn verify(&self, kind: CandidateKind) -> Result<(), CoreError> {
        let violation = |msg: String| Err(CoreError::InvariantViolation(format!("{kind}: {msg}")));

        for (skey, sel) in &self.selectors {
            for ckey in &sel.matched {
                match self.candidates.get(ckey) {
                    None => return violation(format!("selector {skey} matches unknown candidate {ckey}")),
                    Some(c) if !c.selected_by.contains(skey) => {
                        return violation(format!("{ckey} missing reverse entry for selector {skey}"));
                    }
                    Some(_) => {}
                }
            }
        }

        for (ckey, cand) in &self.candidates {
            for skey in &cand.selected_by {
                match self.selectors.get(skey) {
                    None => return violation(format!("{ckey} selected by unknown selector {skey}")),
                    Some(s) if !s.matched.contains(ckey) => {
                        return violation(format!("selector {skey} missing forward entry for {ckey}"));
                    }
                    Some(_) => {}
                }
            }
            for (skey, sel) in &self.selectors {
                if sel.selector.matches(&cand.labels) != sel.matched.contains(ckey) {
                    return violation(format!(
                        "selector {skey} ({}) disagrees with evaluator for {ckey}",
                        sel.selector
                    ));
                }
            }
        }
        Ok(())
    }
}
