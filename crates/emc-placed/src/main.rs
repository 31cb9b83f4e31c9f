mod cli;
mod config;
mod io;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use emc_core::{
    ChannelSink, Engine, FeedController, FeedSubscriber, FeedTask, ResyncSource, SourceHandle,
    feed_channel,
};
use emc_observe::init_logger;
use emc_prometheus::{Encoder, PrometheusMetrics, TextEncoder};
use taskvisor::{SupervisorConfig, ControllerConfig, Subscribe};

use crate::{cli::Cli, config::DaemonConfig, io::StateFile};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) config + logger, before any runtime thread exists (local offset detection)
    let mut cfg = DaemonConfig::load(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        cfg.logger.level = level.parse()?;
    }
    init_logger(&cfg.logger)?;
    info!(format = %cfg.logger.format, level = %cfg.logger.level, "logger initialized");

    // 2) runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(run(cli, cfg))
}

async fn run(cli: Cli, cfg: DaemonConfig) -> anyhow::Result<()> {
    // 3) engine with delta channel and metrics
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let (sink, mut deltas) = ChannelSink::pair();
    let engine = Arc::new(
        Engine::new(cfg.engine.clone())
            .with_sink(Arc::new(sink))
            .with_metrics(metrics.clone()),
    );

    // 4) initial resync from the state listing
    let source: SourceHandle = Arc::new(StateFile::new(cli.state.clone()));
    let objects = source.list().await?;
    engine.resync(objects)?;

    // 5) supervised change feed
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(FeedSubscriber)];
    let controller = FeedController::new(
        SupervisorConfig::default(),
        ControllerConfig::default(),
        subscribers,
    )
    .await;

    let (senders, streams) = feed_channel(cfg.stream_capacity);
    let feed = FeedTask::new(Arc::clone(&engine), streams, source);
    let closed = feed.closed();
    controller.start(feed, &cfg.feed).await?;

    let reader = tokio::spawn(io::read_events(senders));

    // 6) deltas to stdout until input is drained or interrupted
    let mut out = tokio::io::stdout();
    loop {
        tokio::select! {
            Some(delta) = deltas.recv() => io::write_delta(&mut out, &delta).await?,
            _ = closed.cancelled() => {
                info!("input drained");
                break;
            }
            res = tokio::signal::ctrl_c() => {
                res.context("listening for ctrl-c")?;
                info!("interrupt received; shutting down");
                break;
            }
        }
    }
    if !reader.is_finished() {
        reader.abort();
    }
    match reader.await {
        Ok(Ok(forwarded)) => info!(forwarded, "input reader finished"),
        Ok(Err(e)) => warn!(error = %e, "input reader failed"),
        Err(e) if e.is_cancelled() => info!("input reader stopped"),
        Err(e) => warn!(error = %e, "input reader panicked"),
    }
    let flushed = io::drain_deltas(&mut out, &mut deltas).await?;
    if flushed > 0 {
        info!(flushed, "pending deltas written");
    }

    // 7) diagnostics
    if let Some(path) = &cli.dump_index {
        let snapshot = serde_json::to_vec_pretty(&engine.snapshot())?;
        tokio::fs::write(path, snapshot)
            .await
            .with_context(|| format!("writing index dump {}", path.display()))?;
        info!(path = %path.display(), "index snapshot written");
    }
    if cli.dump_metrics {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
        tokio::io::stderr().write_all(&buf).await?;
    }
    if engine.needs_resync() {
        warn!("exiting with an index that awaits resync");
    }
    Ok(())
}
