use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use emc_core::EngineConfig;
use emc_model::FeedPolicy;
use emc_observe::LoggerConfig;

const DEFAULT_STREAM_CAPACITY: usize = 1024;

/// Daemon configuration file; every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DaemonConfig {
    pub logger: LoggerConfig,
    pub engine: EngineConfig,
    pub feed: FeedPolicy,
    /// Buffered events per change stream.
    pub stream_capacity: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            engine: EngineConfig::default(),
            feed: FeedPolicy::default(),
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}

impl DaemonConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emc_model::RestartStrategy;
    use emc_observe::LoggerFormat;

    #[test]
    fn missing_path_yields_defaults() {
        let cfg = DaemonConfig::load(None).unwrap();
        assert_eq!(cfg, DaemonConfig::default());
        assert_eq!(cfg.stream_capacity, 1024);
    }

    #[test]
    fn sections_are_independent() {
        let cfg: DaemonConfig = serde_json::from_str(
            r#"{
                "logger": {"format": "json"},
                "engine": {"affinityLabel": "topology.kubernetes.io/zone"},
                "feed": {"restart": "always"},
                "streamCapacity": 16
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.logger.format, LoggerFormat::Json);
        assert_eq!(cfg.engine.affinity_label.as_deref(), Some("topology.kubernetes.io/zone"));
        assert!(!cfg.engine.verify_after_apply);
        assert_eq!(cfg.feed.restart, RestartStrategy::Always);
        assert_eq!(cfg.feed.name, "emc-change-feed");
        assert_eq!(cfg.stream_capacity, 16);
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = DaemonConfig::load(Some(Path::new("/nonexistent/emc.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/emc.json"));
    }
}
