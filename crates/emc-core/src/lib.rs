pub mod controller;
pub mod engine;
pub mod error;
pub mod feed;
pub mod index;
pub mod map;
pub mod metrics;
pub mod resolver;
pub mod selector;
pub mod sink;

pub use controller::{FeedController, FeedSubscriber, FeedTask, ResyncSource, SourceHandle};
pub use engine::{Engine, EngineConfig, EngineSnapshot};
pub use error::CoreError;
pub use feed::{FeedExit, FeedSenders, FeedStreams, channel as feed_channel, run_feed};
pub use index::{IndexSnapshot, IndexStore};
pub use metrics::{EventOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use resolver::{BindingResolver, CompatHandle, Compatibility, LabelAffinity, PassThrough};
pub use selector::{Requirement, Selector, matches};
pub use sink::{BindingSink, ChannelSink, NoopSink, SinkHandle};

pub mod prelude {
    pub use crate::engine::{Engine, EngineConfig};
    pub use crate::error::CoreError;
    pub use crate::feed::{FeedSenders, FeedStreams};
    pub use crate::resolver::{Compatibility, PassThrough};
    pub use crate::selector::Selector;
    pub use crate::sink::{BindingSink, ChannelSink};
}
