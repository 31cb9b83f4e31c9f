use async_trait::async_trait;
use taskvisor::{Event, EventKind, Subscribe};
use tracing::{debug, error, info, trace, warn};

/// Logs supervisor lifecycle events for the change-feed task.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeedSubscriber;

const QUEUE_CAPACITY: usize = 256;

#[async_trait]
impl Subscribe for FeedSubscriber {
    async fn on_event(&self, event: &Event) {
        let task = event.task.as_deref().unwrap_or("-");
        let reason = event.reason.as_deref().unwrap_or("");
        let attempt = event.attempt.unwrap_or(0);

        match event.kind {
            EventKind::TaskStarting if attempt > 1 => {
                info!(task, attempt, "feed consumer restarting")
            }
            EventKind::TaskStarting => debug!(task, "feed consumer starting"),
            EventKind::TaskStopped => debug!(task, "feed consumer stopped"),
            EventKind::TaskFailed => warn!(task, attempt, reason, "feed consumer failed"),
            EventKind::BackoffScheduled => debug!(task, attempt, "feed consumer restart scheduled"),
            EventKind::ActorExhausted => warn!(task, reason, "feed consumer will not be restarted"),
            EventKind::ActorDead => error!(task, reason, "feed consumer died"),
            EventKind::ControllerRejected => warn!(task, reason, "feed submission rejected"),
            EventKind::ShutdownRequested => info!("shutdown requested"),
            EventKind::GraceExceeded => warn!("feed consumer did not stop within grace period"),
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                error!(task, reason, "event subscriber failure")
            }
            _ => trace!(task, "supervisor event"),
        }
    }

    fn name(&self) -> &'static str {
        "emc-feed"
    }

    fn queue_capacity(&self) -> usize {
        QUEUE_CAPACITY
    }
}
