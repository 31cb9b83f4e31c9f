use emc_model::{CandidateKind, ResourceKind};

use crate::metrics::backend::{EventOutcome, MetricsBackend};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_event(&self, _: ResourceKind, _: EventOutcome) {}

    #[inline(always)]
    fn record_delta(&self, _: usize, _: usize) {}

    #[inline(always)]
    fn record_index_size(&self, _: CandidateKind, _: usize, _: usize) {}

    #[inline(always)]
    fn record_invariant_violation(&self) {}

    #[inline(always)]
    fn record_resync(&self, _: u64) {}
}
