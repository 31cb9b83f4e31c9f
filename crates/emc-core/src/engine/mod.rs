//! Engine: the single write path into the index.
//!
//! Every change event goes through [`Engine::apply`], which filters stale
//! versions, updates the [`IndexStore`] incrementally, re-resolves only the
//! affected placements and hands the resulting deltas to the [`BindingSink`]
//! while still holding the write lock.
mod config;
mod state;
mod versions;

pub use config::EngineConfig;

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use emc_model::{Binding, BindingDelta, CandidateKind, ChangeEvent, EventOp, ObjectKey};
use serde::Serialize;
use tracing::{debug, error, info, instrument, trace, warn};

use self::state::{Mutation, State};
use crate::{
    error::CoreError,
    index::{IndexSnapshot, IndexStore},
    metrics::{EventOutcome, MetricsHandle, noop_metrics},
    resolver::{BindingResolver, CompatHandle},
    sink::{NoopSink, SinkHandle},
};

/// Read-only dump of the engine for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub index: IndexSnapshot,
    pub bindings: BTreeMap<ObjectKey, BTreeSet<Binding>>,
    pub tracked_versions: usize,
    pub needs_resync: bool,
}

pub struct Engine {
    state: RwLock<State>,
    config: EngineConfig,
    sink: SinkHandle,
    metrics: MetricsHandle,
    needs_resync: AtomicBool,
}

impl Engine {
    /// Empty engine with no sink and no metrics.
    pub fn new(config: EngineConfig) -> Self {
        let resolver = BindingResolver::new(config.compatibility());
        Self {
            state: RwLock::new(State::new(resolver)),
            config,
            sink: Arc::new(NoopSink),
            metrics: noop_metrics(),
            needs_resync: AtomicBool::new(false),
        }
    }

    pub fn with_sink(mut self, sink: SinkHandle) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the compatibility rule chosen by the config.
    pub fn with_compatibility(mut self, compat: CompatHandle) -> Self {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.resolver = BindingResolver::new(compat);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `true` after an invariant violation until the next successful [`Engine::resync`].
    pub fn needs_resync(&self) -> bool {
        self.needs_resync.load(Ordering::Acquire)
    }

    /// Apply one change event and return the deltas it produced.
    ///
    /// Stale events and deletes of unknown keys return no deltas. Rejected
    /// events leave the index as it was.
    #[instrument(level = "debug", skip(self, event), fields(kind = %event.kind, op = event.op.as_str(), key = %event.key, version = %event.version))]
    pub fn apply(&self, event: ChangeEvent) -> Result<Vec<BindingDelta>, CoreError> {
        if self.needs_resync() {
            return Err(CoreError::InvariantViolation(
                "index is awaiting a full resync".into(),
            ));
        }

        let kind = event.kind;
        let mut state = self.write();
        let affected = match state.mutate(event) {
            Ok(Mutation::Applied(affected)) => affected,
            Ok(Mutation::Ignored) => {
                debug!("delete of unknown key ignored");
                self.metrics.record_event(kind, EventOutcome::Ignored);
                return Ok(Vec::new());
            }
            Err(CoreError::Stale { stored, got, .. }) => {
                trace!(%stored, %got, "stale event dropped");
                self.metrics.record_event(kind, EventOutcome::Stale);
                return Ok(Vec::new());
            }
            Err(e) => {
                let outcome = match &e {
                    CoreError::NotFound { .. } => EventOutcome::Missing,
                    _ => EventOutcome::Rejected,
                };
                warn!(error = %e, "change event rejected");
                self.metrics.record_event(kind, outcome);
                return Err(e);
            }
        };

        if self.config.verify_after_apply {
            state.index.verify().map_err(|e| self.violation(e))?;
        }

        let State { index, resolver, .. } = &mut *state;
        let deltas = resolver.resolve_all(&affected, index);
        debug!(affected = affected.len(), deltas = deltas.len(), "change applied");

        self.metrics.record_event(kind, EventOutcome::Applied);
        self.publish(&state, &deltas);
        Ok(deltas)
    }

    /// Rebuild the index from a complete listing of live objects.
    ///
    /// Every listed object is treated as an add; deletes in the listing are
    /// skipped. The returned deltas move consumers from the bindings emitted
    /// before the resync to the rebuilt ones.
    #[instrument(level = "info", skip_all, fields(objects = objects.len()))]
    pub fn resync(&self, objects: Vec<ChangeEvent>) -> Result<Vec<BindingDelta>, CoreError> {
        let started = Instant::now();
        let mut state = self.write();

        let previous: Vec<ObjectKey> = state.resolver.placements().cloned().collect();
        state.index = IndexStore::new();
        state.versions = Default::default();

        let mut rejected = 0usize;
        for mut event in objects {
            if event.op == EventOp::Delete {
                continue;
            }
            event.op = EventOp::Add;
            let kind = event.kind;
            match state.mutate(event) {
                Ok(_) => {}
                Err(CoreError::Stale { key, .. }) => {
                    trace!(%key, "duplicate object in listing dropped");
                    self.metrics.record_event(kind, EventOutcome::Stale);
                }
                Err(e) => {
                    rejected += 1;
                    warn!(error = %e, "object skipped during resync");
                    self.metrics.record_event(kind, EventOutcome::Rejected);
                }
            }
        }

        state.index.verify().map_err(|e| self.violation(e))?;

        let State { index, resolver, .. } = &mut *state;
        let placements: BTreeSet<ObjectKey> = index
            .selector_keys(CandidateKind::Location)
            .cloned()
            .chain(previous)
            .collect();
        let deltas = resolver.resolve_all(&placements, index);

        self.needs_resync.store(false, Ordering::Release);
        self.publish(&state, &deltas);

        let elapsed = started.elapsed().as_millis() as u64;
        self.metrics.record_resync(elapsed);
        info!(
            rejected,
            placements = placements.len(),
            deltas = deltas.len(),
            elapsed_ms = elapsed,
            "index rebuilt from full resync"
        );
        Ok(deltas)
    }

    /// Full consistency check of the index.
    pub fn verify(&self) -> Result<(), CoreError> {
        self.read().index.verify().map_err(|e| self.violation(e))
    }

    /// Bindings last emitted for a placement, sorted.
    pub fn bindings(&self, placement: &ObjectKey) -> Vec<Binding> {
        self.read()
            .resolver
            .bindings(placement)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.read();
        EngineSnapshot {
            index: state.index.snapshot(),
            bindings: state.resolver.all_bindings(),
            tracked_versions: state.versions.len(),
            needs_resync: self.needs_resync(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_index_mut<R>(&self, f: impl FnOnce(&mut IndexStore) -> R) -> R {
        f(&mut self.write().index)
    }

    fn publish(&self, state: &State, deltas: &[BindingDelta]) {
        for delta in deltas {
            self.metrics
                .record_delta(delta.removed.len(), delta.added.len());
            self.sink.deliver(delta);
        }
        for kind in CandidateKind::ALL {
            let (selectors, candidates) = state.index.stats(kind);
            self.metrics.record_index_size(kind, selectors, candidates);
        }
    }

    fn violation(&self, e: CoreError) -> CoreError {
        if e.is_fatal() {
            self.needs_resync.store(true, Ordering::Release);
            self.metrics.record_invariant_violation();
            error!(error = %e, "index can no longer be trusted; full resync required");
        }
        e
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("needs_resync", &self.needs_resync())
            .finish_non_exhaustive()
    }
}
