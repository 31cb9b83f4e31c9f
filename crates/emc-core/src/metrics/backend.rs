use std::sync::Arc;

use emc_model::{CandidateKind, ResourceKind};

/// How the engine disposed of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Event mutated the index.
    Applied,
    /// Older than (or equal to) the recorded version; dropped.
    Stale,
    /// Delete of an unknown key; no-op.
    Ignored,
    /// Update of an unknown key.
    Missing,
    /// Malformed selector or payload.
    Rejected,
}

impl EventOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            EventOutcome::Applied => "applied",
            EventOutcome::Stale => "stale",
            EventOutcome::Ignored => "ignored",
            EventOutcome::Missing => "missing",
            EventOutcome::Rejected => "rejected",
        }
    }
}

/// Backend metrics collection interface.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record one change event and its outcome.
    fn record_event(&self, kind: ResourceKind, outcome: EventOutcome);
    /// Record one emitted delta.
    ///
    /// # Arguments
    /// - `removed`: bindings removed by the delta
    /// - `added`: bindings added by the delta
    fn record_delta(&self, removed: usize, added: usize);
    /// Record current index size for one selector kind.
    fn record_index_size(&self, kind: CandidateKind, selectors: usize, candidates: usize);
    /// Record a detected forward/reverse disagreement.
    fn record_invariant_violation(&self);
    /// Record a completed full resync.
    fn record_resync(&self, duration_ms: u64);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
