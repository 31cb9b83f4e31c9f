//! Supervision of the change-feed consumer via taskvisor.
//! - Owns a `Supervisor` instance and its run loop.
//! - Builds the feed task from an [`Engine`](crate::Engine) and its streams.
//! - Submits it with restart/backoff mapped from [`FeedPolicy`].
mod subscriber;
mod task;

pub use subscriber::FeedSubscriber;
pub use task::{FeedTask, ResyncSource, SourceHandle};

use std::sync::Arc;

use taskvisor::{SupervisorConfig, ControllerConfig, Subscribe, Supervisor, TaskRef};
use tracing::{debug, error, info, instrument};

use crate::{error::CoreError, map::to_controller_spec};
use emc_model::FeedPolicy;

/// Thin wrapper around a running taskvisor [`Supervisor`].
pub struct FeedController {
    sup: Arc<Supervisor>,
}

impl FeedController {
    /// Create a supervisor and start its run loop in background.
    ///
    /// A run-loop failure after startup is logged; the feed task itself
    /// reports through the supervisor events.
    ///
    /// `sup_cfg`: supervisor settings
    /// `ctrl_cfg`: controller settings
    /// `subscribers`: event subscribers, usually including [`FeedSubscriber`]
    pub async fn new(
        sup_cfg: SupervisorConfig,
        ctrl_cfg: ControllerConfig,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let sup = Supervisor::builder(sup_cfg)
            .with_subscribers(subscribers)
            .with_controller(ctrl_cfg)
            .build();

        let runner = Arc::clone(&sup);
        tokio::spawn(async move {
            if let Err(e) = runner.run(Vec::new()).await {
                error!(error = %e, "supervisor run loop exited with error");
            }
        });
        sup.wait_ready().await;
        info!("supervisor is ready to accept tasks");
        Self { sup }
    }

    pub fn supervisor(&self) -> Arc<Supervisor> {
        Arc::clone(&self.sup)
    }

    /// Submit a prepared task under the given policy.
    #[instrument(level = "debug", skip(self, task, policy), fields(task = %policy.name, restart = ?policy.restart))]
    pub async fn submit(&self, task: TaskRef, policy: &FeedPolicy) -> Result<(), CoreError> {
        debug!("submitting via controller");
        self.sup
            .submit(to_controller_spec(task, policy))
            .await
            .map_err(|e| CoreError::Supervisor(e.to_string()))
    }

    /// Build the feed task and submit it under `policy.name`.
    pub async fn start(&self, feed: FeedTask, policy: &FeedPolicy) -> Result<(), CoreError> {
        self.submit(feed.into_task(policy.name.clone()), policy).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use emc_model::{ChangeEvent, EventOp, Labels, ObjectKey};

    use super::*;
    use crate::engine::Engine;

    struct EmptyListing;

    #[async_trait]
    impl ResyncSource for EmptyListing {
        async fn list(&self) -> Result<Vec<ChangeEvent>, CoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn supervised_feed_drains_and_signals_closed() {
        let controller = FeedController::new(
            SupervisorConfig::default(),
            ControllerConfig::default(),
            Vec::new(),
        )
        .await;

        let engine = Arc::new(Engine::default());
        let (tx, streams) = crate::feed::channel(4);
        let feed = FeedTask::new(Arc::clone(&engine), streams, Arc::new(EmptyListing));
        let closed = feed.closed();
        controller.start(feed, &FeedPolicy::default()).await.unwrap();

        let key = ObjectKey::new("root", "l").unwrap();
        tx.route(ChangeEvent::location(EventOp::Add, key.clone(), 1, Labels::new()))
            .await
            .unwrap();
        drop(tx);

        tokio::time::timeout(Duration::from_secs(5), closed.cancelled())
            .await
            .expect("feed task must finish once input ends");
        assert!(engine.snapshot().index.locations.candidates.contains_key(&key));
    }
}
