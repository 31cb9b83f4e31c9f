use std::sync::Arc;

use prometheus::{
    Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    proto::MetricFamily,
};

use emc_core::{EventOutcome, MetricsBackend};
use emc_model::{CandidateKind, ResourceKind};

const NAMESPACE: &str = "emc";

/// Prometheus-backed [`MetricsBackend`].
///
/// Every label is bounded: `kind` is a resource kind, `outcome` an
/// [`EventOutcome`] label and `op` either `added` or `removed`.
#[derive(Clone)]
pub struct PrometheusMetrics {
    events: IntCounterVec,
    binding_changes: IntCounterVec,
    deltas: IntCounter,
    index_selectors: IntGaugeVec,
    index_candidates: IntGaugeVec,
    invariant_violations: IntCounter,
    resync_duration: Histogram,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register all collectors in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let events = IntCounterVec::new(
            Opts::new("events_total", "Change events by kind and outcome").namespace(NAMESPACE),
            &["kind", "outcome"],
        )?;
        registry.register(Box::new(events.clone()))?;

        let binding_changes = IntCounterVec::new(
            Opts::new("binding_changes_total", "Bindings added or removed").namespace(NAMESPACE),
            &["op"],
        )?;
        registry.register(Box::new(binding_changes.clone()))?;

        let deltas = IntCounter::with_opts(
            Opts::new("deltas_total", "Binding deltas delivered to the sink").namespace(NAMESPACE),
        )?;
        registry.register(Box::new(deltas.clone()))?;

        let index_selectors = IntGaugeVec::new(
            Opts::new("index_selectors", "Live selectors per kind").namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(index_selectors.clone()))?;

        let index_candidates = IntGaugeVec::new(
            Opts::new("index_candidates", "Known candidates per kind").namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(index_candidates.clone()))?;

        let invariant_violations = IntCounter::with_opts(
            Opts::new(
                "invariant_violations_total",
                "Forward/reverse index disagreements detected",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(invariant_violations.clone()))?;

        let resync_duration = Histogram::with_opts(
            HistogramOpts::new("resync_duration_seconds", "Full resync duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
        )?;
        registry.register(Box::new(resync_duration.clone()))?;

        Ok(Self {
            events,
            binding_changes,
            deltas,
            index_selectors,
            index_candidates,
            invariant_violations,
            resync_duration,
            registry,
        })
    }

    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_event(&self, kind: ResourceKind, outcome: EventOutcome) {
        self.events
            .with_label_values(&[kind.as_str(), outcome.as_label()])
            .inc();
    }

    fn record_delta(&self, removed: usize, added: usize) {
        self.deltas.inc();
        self.binding_changes
            .with_label_values(&["removed"])
            .inc_by(removed as u64);
        self.binding_changes
            .with_label_values(&["added"])
            .inc_by(added as u64);
    }

    fn record_index_size(&self, kind: CandidateKind, selectors: usize, candidates: usize) {
        self.index_selectors
            .with_label_values(&[kind.as_str()])
            .set(selectors as i64);
        self.index_candidates
            .with_label_values(&[kind.as_str()])
            .set(candidates as i64);
    }

    fn record_invariant_violation(&self) {
        self.invariant_violations.inc();
    }

    fn record_resync(&self, duration_ms: u64) {
        self.resync_duration.observe(duration_ms as f64 / 1000.0);
    }
}
