//! Line-delimited JSON on stdin/stdout and the state-file resync source.
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, warn};

use emc_core::{CoreError, FeedSenders, ResyncSource};
use emc_model::{BindingDelta, ChangeEvent};

/// Parse one input line; blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Option<Result<ChangeEvent, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Forward events from stdin until EOF; malformed lines are logged and skipped.
pub async fn read_events(senders: FeedSenders) -> anyhow::Result<u64> {
    forward_events(BufReader::new(tokio::io::stdin()), &senders).await
}

/// Forward events from `input` until EOF.
///
/// A line that is not UTF-8 or not a change event is skipped with a warning;
/// only read errors and a closed feed end the loop early.
pub async fn forward_events<R>(mut input: R, senders: &FeedSenders) -> anyhow::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let (mut lineno, mut forwarded) = (0u64, 0u64);

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        lineno += 1;
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                warn!(line = lineno, error = %e, "malformed change event skipped");
                continue;
            }
        };
        match parse_line(line) {
            None => continue,
            Some(Ok(event)) => {
                senders.route(event).await?;
                forwarded += 1;
            }
            Some(Err(e)) => warn!(line = lineno, error = %e, "malformed change event skipped"),
        }
    }
    info!(lines = lineno, forwarded, "input closed");
    Ok(forwarded)
}

/// Write one delta as a JSON line.
pub async fn write_delta<W>(out: &mut W, delta: &BindingDelta) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut buf = serde_json::to_vec(delta)?;
    buf.push(b'\n');
    out.write_all(&buf).await?;
    out.flush().await?;
    Ok(())
}

/// Write everything already queued without waiting for more.
pub async fn drain_deltas<W>(out: &mut W, rx: &mut mpsc::UnboundedReceiver<BindingDelta>) -> anyhow::Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut n = 0;
    while let Ok(delta) = rx.try_recv() {
        write_delta(out, &delta).await?;
        n += 1;
    }
    Ok(n)
}

/// Complete object listing kept in a file of change events, one per line.
///
/// Without a path the listing is empty.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: Option<PathBuf>,
}

impl StateFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ResyncSource for StateFile {
    async fn list(&self) -> Result<Vec<ChangeEvent>, CoreError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::Source(format!("reading {}: {e}", path.display())))?;

        let mut objects = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            match parse_line(line) {
                None => {}
                Some(Ok(event)) => objects.push(event),
                Some(Err(e)) => {
                    return Err(CoreError::Source(format!(
                        "{}:{}: {e}",
                        path.display(),
                        idx + 1
                    )));
                }
            }
        }
        debug!(path = %path.display(), objects = objects.len(), "state listing loaded");
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emc_model::{Binding, ObjectKey, ResourceKind};

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new("root", name).unwrap()
    }

    #[test]
    fn parse_line_skips_blank_and_comments() {
        assert!(parse_line("   ").is_none());
        assert!(parse_line("# seed objects").is_none());
        assert!(parse_line("{not json").unwrap().is_err());

        let event = parse_line(
            r#"{"kind":"location","op":"add","key":"root|l1","version":2,"payload":{"labels":{"env":"dev"}}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(event.kind, ResourceKind::Location);
        assert_eq!(event.key, key("l1"));
    }

    #[tokio::test]
    async fn invalid_utf8_line_does_not_stop_input() {
        let (tx, mut streams) = emc_core::feed_channel(8);
        let input: &[u8] = b"{\"kind\":\"location\",\"op\":\"add\",\"key\":\"root|l\",\"version\":1,\"payload\":{\"labels\":{}}}\n\
\xff\xfe garbage\n\
{not json\n\
{\"kind\":\"endpoint\",\"op\":\"add\",\"key\":\"root|n\",\"version\":1,\"payload\":{\"labels\":{}}}";

        let forwarded = forward_events(input, &tx).await.unwrap();
        assert_eq!(forwarded, 2);
        assert_eq!(streams.locations.recv().await.unwrap().key, key("l"));
        assert_eq!(streams.endpoints.recv().await.unwrap().key, key("n"));
    }

    #[tokio::test]
    async fn deltas_are_written_one_per_line() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for name in ["p1", "p2"] {
            let mut delta = BindingDelta::new(key(name));
            delta.added.push(Binding::new(key("e"), key("l")));
            tx.send(delta).unwrap();
        }

        let mut out = Vec::new();
        assert_eq!(drain_deltas(&mut out, &mut rx).await.unwrap(), 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: BindingDelta = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.placement, key("p1"));
    }

    #[tokio::test]
    async fn state_file_without_path_is_empty() {
        assert!(StateFile::new(None).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn state_file_reports_bad_line() {
        let path = std::env::temp_dir().join(format!("emc-state-{}.ndjson", std::process::id()));
        tokio::fs::write(
            &path,
            "# listing\n{\"kind\":\"endpoint\",\"op\":\"add\",\"key\":\"root|e\",\"version\":1,\"payload\":{\"labels\":{}}}\nnope\n",
        )
        .await
        .unwrap();

        let err = StateFile::new(Some(path.clone())).list().await.unwrap_err();
        let _ = tokio::fs::remove_file(&path).await;
        assert!(matches!(err, CoreError::Source(ref msg) if msg.contains(".ndjson:3:")));
    }
}
