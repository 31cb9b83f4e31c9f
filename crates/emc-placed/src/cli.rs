use std::path::PathBuf;

use clap::Parser;

/// Placement matching daemon.
///
/// Reads change events as JSON lines on stdin and writes binding deltas as
/// JSON lines on stdout. Logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "emc-placed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Daemon configuration file (JSON).
    #[arg(long, short = 'c', env = "EMC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listing of live objects used for the initial and every later resync,
    /// one change event per line.
    #[arg(long, env = "EMC_STATE")]
    pub state: Option<PathBuf>,

    /// Write the index snapshot to this file on shutdown.
    #[arg(long, value_name = "PATH")]
    pub dump_index: Option<PathBuf>,

    /// Print Prometheus metrics to stderr on shutdown.
    #[arg(long)]
    pub dump_metrics: bool,

    /// Log filter, overrides `logger.level` from the config file.
    #[arg(long, env = "EMC_LOG")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "emc-placed",
            "-c",
            "/etc/emc.json",
            "--state",
            "objects.ndjson",
            "--dump-index",
            "index.json",
            "--dump-metrics",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("/etc/emc.json")));
        assert_eq!(cli.state.as_deref(), Some(std::path::Path::new("objects.ndjson")));
        assert!(cli.dump_metrics);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["emc-placed", "--verbose-please"]).is_err());
    }
}
