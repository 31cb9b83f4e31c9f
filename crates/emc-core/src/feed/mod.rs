//! Change feed: one bounded stream per resource kind, merged into the engine.
//!
//! Events for a given key always travel on the stream of its kind, so merging
//! the three streams keeps per-key order while interleaving across keys.
use emc_model::{ChangeEvent, ResourceKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use crate::{engine::Engine, error::CoreError};

/// Receiving ends consumed by [`run_feed`].
#[derive(Debug)]
pub struct FeedStreams {
    pub placements: mpsc::Receiver<ChangeEvent>,
    pub locations: mpsc::Receiver<ChangeEvent>,
    pub endpoints: mpsc::Receiver<ChangeEvent>,
}

/// Producer side; routes each event to the stream of its kind.
#[derive(Debug, Clone)]
pub struct FeedSenders {
    placements: mpsc::Sender<ChangeEvent>,
    locations: mpsc::Sender<ChangeEvent>,
    endpoints: mpsc::Sender<ChangeEvent>,
}

impl FeedSenders {
    /// Send an event, waiting for capacity on its stream.
    pub async fn route(&self, event: ChangeEvent) -> Result<(), CoreError> {
        let kind = event.kind;
        let tx = match kind {
            ResourceKind::Placement => &self.placements,
            ResourceKind::Location => &self.locations,
            ResourceKind::Endpoint => &self.endpoints,
        };
        tx.send(event)
            .await
            .map_err(|_| CoreError::Source(format!("{kind} stream is closed")))
    }
}

/// Create the three streams, each buffering up to `capacity` events.
pub fn channel(capacity: usize) -> (FeedSenders, FeedStreams) {
    let capacity = capacity.max(1);
    let (ptx, prx) = mpsc::channel(capacity);
    let (ltx, lrx) = mpsc::channel(capacity);
    let (etx, erx) = mpsc::channel(capacity);
    (
        FeedSenders {
            placements: ptx,
            locations: ltx,
            endpoints: etx,
        },
        FeedStreams {
            placements: prx,
            locations: lrx,
            endpoints: erx,
        },
    )
}

/// Why [`run_feed`] returned without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedExit {
    Cancelled,
    /// Every producer hung up.
    Closed,
}

/// Drain the streams into the engine until cancelled or all streams close.
///
/// Rejected events are skipped (the engine has already logged and counted
/// them). An error is returned only when the index can no longer be trusted.
pub async fn run_feed(
    engine: &Engine,
    streams: &mut FeedStreams,
    cancel: &CancellationToken,
) -> Result<FeedExit, CoreError> {
    let (mut placements, mut locations, mut endpoints) = (true, true, true);
    let mut applied = 0u64;

    let exit = loop {
        if !(placements || locations || endpoints) {
            break FeedExit::Closed;
        }
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break FeedExit::Cancelled,
            ev = streams.placements.recv(), if placements => { placements &= ev.is_some(); ev }
            ev = streams.locations.recv(), if locations => { locations &= ev.is_some(); ev }
            ev = streams.endpoints.recv(), if endpoints => { endpoints &= ev.is_some(); ev }
        };
        let Some(event) = event else {
            trace!(placements, locations, endpoints, "change stream closed");
            continue;
        };

        match engine.apply(event) {
            Ok(_) => applied += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => debug!(error = %e, "event skipped"),
        }
    };

    info!(?exit, applied, "change feed stopped");
    Ok(exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use emc_model::{EventOp, Labels, ObjectKey, PlacementSpec, SelectorSpec};

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new("root", name).unwrap()
    }

    #[tokio::test]
    async fn merges_streams_until_closed() {
        let engine = Engine::default();
        let (tx, mut streams) = channel(8);

        let everything = PlacementSpec::new(SelectorSpec::everything(), SelectorSpec::everything());
        tx.route(ChangeEvent::placement(EventOp::Add, key("p"), 1, everything))
            .await
            .unwrap();
        tx.route(ChangeEvent::location(EventOp::Add, key("l"), 1, Labels::new()))
            .await
            .unwrap();
        tx.route(ChangeEvent::endpoint(EventOp::Add, key("e"), 1, Labels::new()))
            .await
            .unwrap();
        // Rejected, but does not stop the feed.
        tx.route(ChangeEvent::endpoint(EventOp::Update, key("ghost"), 1, Labels::new()))
            .await
            .unwrap();
        drop(tx);

        let exit = run_feed(&engine, &mut streams, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(exit, FeedExit::Closed);
        assert_eq!(engine.bindings(&key("p")).len(), 1);
    }

    #[tokio::test]
    async fn closes_when_no_event_was_ever_sent() {
        let engine = Engine::default();
        let (tx, mut streams) = channel(1);
        drop(tx);

        let exit = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            run_feed(&engine, &mut streams, &CancellationToken::new()),
        )
        .await
        .expect("feed must stop once every stream is closed")
        .unwrap();
        assert_eq!(exit, FeedExit::Closed);
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let engine = Engine::default();
        let (_tx, mut streams) = channel(1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let exit = run_feed(&engine, &mut streams, &cancel).await.unwrap();
        assert_eq!(exit, FeedExit::Cancelled);
    }

    #[tokio::test]
    async fn route_fails_once_streams_are_gone() {
        let (tx, streams) = channel(1);
        drop(streams);
        let err = tx
            .route(ChangeEvent::delete(ResourceKind::Location, key("l"), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Source(_)));
    }
}
