use std::collections::BTreeSet;

use emc_model::{CandidateKind, ChangeEvent, EventOp, Labels, ObjectKey, Payload, PlacementSpec, ResourceKind};

use super::versions::VersionTable;
use crate::{error::CoreError, index::IndexStore, resolver::BindingResolver, selector::Selector};

/// What a single event did to the index.
#[derive(Debug)]
pub(super) enum Mutation {
    /// Index changed; these placements must be re-resolved.
    Applied(BTreeSet<ObjectKey>),
    /// Delete of an unknown key; only the tombstone was recorded.
    Ignored,
}

/// Everything guarded by the engine lock.
#[derive(Debug)]
pub(super) struct State {
    pub(super) index: IndexStore,
    pub(super) resolver: BindingResolver,
    pub(super) versions: VersionTable,
}

impl State {
    pub(super) fn new(resolver: BindingResolver) -> Self {
        Self {
            index: IndexStore::new(),
            resolver,
            versions: VersionTable::default(),
        }
    }

    /// Apply one event to the index and version table.
    ///
    /// Any error leaves both untouched.
    pub(super) fn mutate(&mut self, event: ChangeEvent) -> Result<Mutation, CoreError> {
        event
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let ChangeEvent {
            kind,
            op,
            key,
            version,
            payload,
        } = event;

        if let Some(stored) = self.versions.stale(kind, &key, op, version) {
            return Err(CoreError::Stale {
                kind,
                key,
                stored,
                got: version,
            });
        }

        let live = self.versions.is_live(kind, &key);
        let affected = match (op, payload) {
            (EventOp::Delete, _) if !live => {
                self.versions.record(kind, key, version, false);
                return Ok(Mutation::Ignored);
            }
            (EventOp::Update, _) if !live => return Err(CoreError::NotFound { kind, key }),
            (EventOp::Delete, _) => self.remove(kind, &key),
            (_, Some(Payload::Placement(spec))) => self.upsert_placement(&key, &spec)?,
            (_, Some(Payload::Labels(labels))) => self.upsert_candidate(kind, &key, labels)?,
            (_, None) => {
                return Err(CoreError::Validation(format!("{kind} {key}: missing payload")));
            }
        };

        self.versions.record(kind, key, version, op != EventOp::Delete);
        Ok(Mutation::Applied(affected))
    }

    /// Both selectors are compiled before either is installed, so a bad
    /// endpoint selector cannot leave a new location selector behind.
    fn upsert_placement(
        &mut self,
        key: &ObjectKey,
        spec: &PlacementSpec,
    ) -> Result<BTreeSet<ObjectKey>, CoreError> {
        let locations = Selector::compile(&spec.location_selector)
            .map_err(|e| CoreError::Validation(format!("location selector of {key}: {e}")))?;
        let endpoints = Selector::compile(&spec.endpoint_selector)
            .map_err(|e| CoreError::Validation(format!("endpoint selector of {key}: {e}")))?;

        self.index.upsert_compiled(key, locations, CandidateKind::Location);
        self.index.upsert_compiled(key, endpoints, CandidateKind::Endpoint);
        Ok(BTreeSet::from([key.clone()]))
    }

    fn upsert_candidate(
        &mut self,
        kind: ResourceKind,
        key: &ObjectKey,
        labels: Labels,
    ) -> Result<BTreeSet<ObjectKey>, CoreError> {
        let Some(candidate) = kind.candidate() else {
            return Err(CoreError::Validation(format!("{kind} {key}: labels payload on a placement")));
        };
        let change = self.index.upsert_candidate(key, labels, candidate);
        Ok(change.touched().cloned().collect())
    }

    fn remove(&mut self, kind: ResourceKind, key: &ObjectKey) -> BTreeSet<ObjectKey> {
        match kind.candidate() {
            None => {
                for side in CandidateKind::ALL {
                    self.index.remove_selector(key, side);
                }
                BTreeSet::from([key.clone()])
            }
            Some(candidate) => self
                .index
                .remove_candidate(key, candidate)
                .map(|change| change.lost.into_iter().collect())
                .unwrap_or_default(),
        }
    }
}
