//! Metrics collection abstraction for the matching engine.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected into the [`crate::Engine`].
mod backend;
pub use backend::{EventOutcome, MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
