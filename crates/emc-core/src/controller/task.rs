use std::sync::Arc;

use async_trait::async_trait;
use taskvisor::{TaskError, TaskFn, TaskRef};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use emc_model::ChangeEvent;

use crate::{
    engine::Engine,
    error::CoreError,
    feed::{FeedExit, FeedStreams, run_feed},
};

/// Complete listing of live objects, used to rebuild the index.
#[async_trait]
pub trait ResyncSource: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<ChangeEvent>, CoreError>;
}

pub type SourceHandle = Arc<dyn ResyncSource>;

/// Change-feed consumer as a restartable task.
///
/// Each attempt first rebuilds the index from the [`ResyncSource`] if the
/// engine asked for it, then drains the streams. An index invariant
/// violation fails the attempt so the supervisor restarts it with backoff.
pub struct FeedTask {
    engine: Arc<Engine>,
    streams: Arc<Mutex<FeedStreams>>,
    source: SourceHandle,
    closed: CancellationToken,
}

impl FeedTask {
    pub fn new(engine: Arc<Engine>, streams: FeedStreams, source: SourceHandle) -> Self {
        Self {
            engine,
            streams: Arc::new(Mutex::new(streams)),
            source,
            closed: CancellationToken::new(),
        }
    }

    /// Token cancelled once every producer has hung up and the streams are drained.
    pub fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    pub fn into_task(self, name: String) -> TaskRef {
        let Self {
            engine,
            streams,
            source,
            closed,
        } = self;

        TaskFn::arc(name, move |ctx: CancellationToken| {
            let engine = Arc::clone(&engine);
            let streams = Arc::clone(&streams);
            let source = Arc::clone(&source);
            let closed = closed.clone();

            async move { attempt(&engine, &streams, source.as_ref(), &ctx, &closed).await }
        })
    }
}

/// One supervised attempt: resync if flagged, then drain the streams.
async fn attempt(
    engine: &Engine,
    streams: &Mutex<FeedStreams>,
    source: &dyn ResyncSource,
    ctx: &CancellationToken,
    closed: &CancellationToken,
) -> Result<(), TaskError> {
    if ctx.is_cancelled() {
        return Err(TaskError::Canceled);
    }
    if engine.needs_resync() {
        resync(engine, source).await?;
    }

    let mut streams = tokio::select! {
        guard = streams.lock() => guard,
        _ = ctx.cancelled() => return Err(TaskError::Canceled),
    };
    debug!("change feed attached");

    match run_feed(engine, &mut streams, ctx).await {
        Ok(FeedExit::Cancelled) => Err(TaskError::Canceled),
        Ok(FeedExit::Closed) => {
            closed.cancel();
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "change feed aborted");
            Err(TaskError::Fail {
                reason: e.to_string(),
            })
        }
    }
}

async fn resync(engine: &Engine, source: &dyn ResyncSource) -> Result<(), TaskError> {
    let objects = source.list().await.map_err(|e| TaskError::Fail {
        reason: format!("resync listing failed: {e}"),
    })?;
    let deltas = engine.resync(objects).map_err(|e| TaskError::Fail {
        reason: format!("resync failed: {e}"),
    })?;
    info!(deltas = deltas.len(), "index rebuilt before resuming feed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use emc_model::{CandidateKind, EventOp, Labels, ObjectKey, PlacementSpec, SelectorSpec};

    struct Listing(Vec<ChangeEvent>);

    #[async_trait]
    impl ResyncSource for Listing {
        async fn list(&self) -> Result<Vec<ChangeEvent>, CoreError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn resync_helper_rebuilds_from_source() {
        let engine = Engine::new(EngineConfig::default());
        let key = ObjectKey::new("root", "l").unwrap();
        let source = Listing(vec![ChangeEvent::location(EventOp::Add, key.clone(), 3, Labels::new())]);

        resync(&engine, &source).await.unwrap();

        let snap = engine.snapshot();
        assert!(snap.index.locations.candidates.contains_key(&key));
        assert!(!snap.needs_resync);
    }

    #[tokio::test]
    async fn violation_fails_attempt_and_next_attempt_resyncs() {
        let engine = Engine::new(EngineConfig {
            verify_after_apply: true,
            ..EngineConfig::default()
        });
        let key = |name: &str| ObjectKey::new("root", name).unwrap();
        let listing = vec![
            ChangeEvent::location(EventOp::Add, key("l"), 1, Labels::new()),
            ChangeEvent::endpoint(EventOp::Add, key("e"), 1, Labels::new()),
            ChangeEvent::placement(
                EventOp::Add,
                key("p"),
                1,
                PlacementSpec::new(SelectorSpec::everything(), SelectorSpec::everything()),
            ),
        ];
        engine.resync(listing.clone()).unwrap();
        assert!(engine.with_index_mut(|index| index.drop_reverse_entries(&key("l"), CandidateKind::Location)));

        let (tx, streams) = crate::feed::channel(4);
        let streams = Mutex::new(streams);
        let source = Listing(listing);
        let (ctx, closed) = (CancellationToken::new(), CancellationToken::new());

        tx.route(ChangeEvent::endpoint(EventOp::Add, key("e2"), 1, Labels::new()))
            .await
            .unwrap();
        let first = attempt(&engine, &streams, &source, &ctx, &closed).await;
        assert!(matches!(first, Err(TaskError::Fail { .. })));
        assert!(engine.needs_resync());
        assert!(!closed.is_cancelled());

        drop(tx);
        let second = attempt(&engine, &streams, &source, &ctx, &closed).await;
        assert!(second.is_ok());
        assert!(closed.is_cancelled());
        assert!(!engine.needs_resync());
        engine.verify().unwrap();
        assert_eq!(engine.bindings(&key("p")).len(), 1);
    }

    #[tokio::test]
    async fn closed_token_is_shared() {
        let engine = Arc::new(Engine::default());
        let (_tx, streams) = crate::feed::channel(1);
        let feed = FeedTask::new(engine, streams, Arc::new(Listing(Vec::new())));
        let closed = feed.closed();
        assert!(!closed.is_cancelled());
        feed.closed.cancel();
        assert!(closed.is_cancelled());
    }
}
