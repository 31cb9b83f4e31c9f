mod backoff;
pub use backoff::BackoffStrategy;

mod jitter;
pub use jitter::JitterStrategy;

mod restart;
pub use restart::RestartStrategy;

mod feed;
pub use feed::FeedPolicy;
