//! Delivery of binding deltas to the sync controller.
use std::sync::Arc;

use emc_model::BindingDelta;
use tokio::sync::mpsc;
use tracing::warn;

/// Consumer of settled binding deltas.
///
/// Called with the engine's write lock held, in apply order; implementations
/// must not block.
pub trait BindingSink: Send + Sync + 'static {
    fn deliver(&self, delta: &BindingDelta);
}

/// Shared handle to a sink.
pub type SinkHandle = Arc<dyn BindingSink>;

/// Sink that drops every delta.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl BindingSink for NoopSink {
    #[inline(always)]
    fn deliver(&self, _: &BindingDelta) {}
}

/// Sink forwarding deltas over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<BindingDelta>,
}

impl ChannelSink {
    /// Create a sink and the receiving end for the consumer.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<BindingDelta>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl BindingSink for ChannelSink {
    fn deliver(&self, delta: &BindingDelta) {
        if self.tx.send(delta.clone()).is_err() {
            warn!(placement = %delta.placement, "binding consumer is gone; delta dropped");
        }
    }
}
