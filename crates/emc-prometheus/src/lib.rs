//! Prometheus metrics backend for the placement engine.
//!
//! [`PrometheusMetrics`] implements [`emc_core::MetricsBackend`]; inject it
//! with [`emc_core::Engine::with_metrics`] and expose [`PrometheusMetrics::gather`]
//! through whatever HTTP stack the host binary already runs.
//!
//! ## Metrics
//! - `emc_events_total{kind, outcome}` - Counter
//! - `emc_binding_changes_total{op}` - Counter
//! - `emc_deltas_total` - Counter
//! - `emc_index_selectors{kind}` - Gauge
//! - `emc_index_candidates{kind}` - Gauge
//! - `emc_invariant_violations_total` - Counter
//! - `emc_resync_duration_seconds` - Histogram
mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
