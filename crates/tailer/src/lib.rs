//! File Tailer (C2): resumable, fault-tolerant follow-from-end of a
//! growing log file.
//!
//! No coalescing and no parsing happen here — this crate only ever yields
//! raw lines in file order; semantic work belongs to `pulseguard-parser`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, warn};

/// One line delivered from a tailed file, tagged with its source path so a
/// single consumer task can fan in several tailers.
#[derive(Debug, Clone)]
pub struct RawLine {
    pub path: PathBuf,
    pub line: String,
}

/// Tunables for a single tailer. Defaults match the spec: 500ms poll
/// cadence, 5s fixed retry delay on any filesystem error.
#[derive(Debug, Clone, Copy)]
pub struct TailerConfig {
    pub poll_interval: Duration,
    pub retry_delay: Duration,
}

impl Default for TailerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Handle to a running tailer task. Dropping it does not stop the task —
/// call `stop()` explicitly, matching the spec's "stopping cancels pending
/// retries and releases watches" contract.
pub struct TailerHandle {
    join: tokio::task::JoinHandle<()>,
}

impl TailerHandle {
    /// Cancels the poll loop and any pending retry sleep immediately.
    pub fn stop(self) {
        self.join.abort();
    }
}

#[derive(Clone, Copy)]
struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    #[cfg(not(unix))]
    fn of(_meta: &std::fs::Metadata) -> Self {
        Self {}
    }

    #[cfg(unix)]
    fn changed(&self, other: &FileIdentity) -> bool {
        self.dev != other.dev || self.ino != other.ino
    }

    #[cfg(not(unix))]
    fn changed(&self, _other: &FileIdentity) -> bool {
        false
    }
}

struct TailState {
    cursor: u64,
    identity: FileIdentity,
}

/// Spawns a tailer task that follows `path` from end-of-file, pushing each
/// newly appended line to `tx`. Runs until `stop()` is called on the
/// returned handle; filesystem errors never terminate it, only pause it for
/// `config.retry_delay`.
pub fn spawn(path: PathBuf, config: TailerConfig, tx: mpsc::Sender<RawLine>) -> TailerHandle {
    let join = tokio::spawn(async move {
        run(path, config, tx).await;
    });
    TailerHandle { join }
}

async fn run(path: PathBuf, config: TailerConfig, tx: mpsc::Sender<RawLine>) {
    loop {
        match open_at_end(&path).await {
            Ok(mut state) => {
                let mut ticker = interval(config.poll_interval);
                loop {
                    ticker.tick().await;
                    match poll_once(&path, &mut state, &tx).await {
                        Ok(()) => {}
                        Err(err) => {
                            warn!(path = %path.display(), error = %err, "tailer poll failed, reopening after retry delay");
                            tokio::time::sleep(config.retry_delay).await;
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "tailer could not open file, retrying");
                tokio::time::sleep(config.retry_delay).await;
            }
        }
    }
}

/// Opens `path` and sets the cursor to its current size — historical
/// backlog is deliberately skipped, matching `tail -f` semantics, so it
/// does not distort trend/anomaly detection downstream.
async fn open_at_end(path: &Path) -> std::io::Result<TailState> {
    let meta = tokio::fs::metadata(path).await?;
    Ok(TailState {
        cursor: meta.len(),
        identity: FileIdentity::of(&meta),
    })
}

async fn poll_once(
    path: &Path,
    state: &mut TailState,
    tx: &mpsc::Sender<RawLine>,
) -> std::io::Result<()> {
    let meta = tokio::fs::metadata(path).await?;
    let current_identity = FileIdentity::of(&meta);
    let current_len = meta.len();

    let rotated = current_identity.changed(&state.identity) || current_len < state.cursor;
    if rotated {
        debug!(path = %path.display(), "detected rotation, resetting cursor to 0");
        state.cursor = 0;
        state.identity = current_identity;
    }

    if current_len <= state.cursor {
        return Ok(());
    }

    let mut file = tokio::fs::File::open(path).await?;
    file.seek(std::io::SeekFrom::Start(state.cursor)).await?;

    let mut buf = vec![0u8; (current_len - state.cursor) as usize];
    file.read_exact(&mut buf).await?;
    state.cursor = current_len;

    let chunk = String::from_utf8_lossy(&buf);
    for line in chunk.split('\n') {
        if line.is_empty() {
            continue;
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        if tx
            .send(RawLine {
                path: path.to_path_buf(),
                line: line.to_string(),
            })
            .await
            .is_err()
        {
            // Receiver dropped; nothing more we can do this poll.
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::sync::mpsc;

    async fn drain(rx: &mut mpsc::Receiver<RawLine>, n: usize) -> Vec<String> {
        let mut out = Vec::new();
        for _ in 0..n {
            let line = tokio::time::timeout(Duration::from_secs(2), rx.recv())
                .await
                .expect("timed out waiting for line")
                .expect("channel closed");
            out.push(line.line);
        }
        out
    }

    #[tokio::test]
    async fn starts_at_end_and_delivers_appended_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "historical line that must be skipped\n").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let config = TailerConfig {
            poll_interval: Duration::from_millis(20),
            retry_delay: Duration::from_millis(50),
        };
        let handle = spawn(path.clone(), config, tx);

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "first appended line").unwrap();
        writeln!(file, "second appended line").unwrap();
        file.flush().unwrap();

        let lines = drain(&mut rx, 2).await;
        assert_eq!(lines, vec!["first appended line", "second appended line"]);

        handle.stop();
    }

    #[tokio::test]
    async fn truncate_then_append_is_read_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "old content here\n").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let config = TailerConfig {
            poll_interval: Duration::from_millis(20),
            retry_delay: Duration::from_millis(50),
        };
        let handle = spawn(path.clone(), config, tx);

        // give the tailer a chance to open and cursor to the end first.
        tokio::time::sleep(Duration::from_millis(60)).await;

        let file = std::fs::OpenOptions::new().write(true).truncate(true).open(&path).unwrap();
        drop(file);
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "ERROR: x").unwrap();
        file.flush().unwrap();

        let lines = drain(&mut rx, 1).await;
        assert_eq!(lines, vec!["ERROR: x"]);

        handle.stop();
    }
}
