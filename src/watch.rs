//! Description file watcher
//!
//! Watches a diagram description file and reports changes so the render
//! controller can re-render. A burst of events (one save, or several quick
//! edits) produces a single change once the file has been quiet for the
//! debounce delay, so the last edit of a burst is never lost.

use anyhow::{Context, Result};
use notify::{Config, Event, PollWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::time::Duration;

/// The watched description file changed and should be re-read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionChanged {
    pub path: PathBuf,
}

/// Watches one description file for changes
pub struct DescriptionWatcher {
    _watcher: PollWatcher,
    event_receiver: Receiver<DescriptionChanged>,
    path: PathBuf,
}

impl std::fmt::Debug for DescriptionWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptionWatcher")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DescriptionWatcher {
    /// Start watching `path`.
    ///
    /// The parent directory is watched rather than the file, because many
    /// editors save atomically (write temp + rename).
    pub fn new(path: &Path, debounce_delay_ms: u64, poll_interval_ms: u64) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Description file not found: {}", path.display());
        }
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let filename = canonical
            .file_name()
            .map(|f| f.to_os_string())
            .with_context(|| format!("Not a file path: {}", canonical.display()))?;
        let parent = canonical
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("No parent directory for {}", canonical.display()))?;

        let (raw_tx, raw_rx) = channel::<()>();
        let (tx, rx) = channel();
        let settled_path = canonical.clone();
        let quiet = Duration::from_millis(debounce_delay_ms);
        std::thread::Builder::new()
            .name("description-debounce".to_string())
            .spawn(move || forward_settled(raw_rx, tx, settled_path, quiet))
            .context("Failed to start debounce thread")?;

        let mut watcher = PollWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| {
                let event = match result {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("Description watch error: {e}");
                        return;
                    }
                };
                if !matches!(
                    event.kind,
                    notify::EventKind::Modify(_) | notify::EventKind::Create(_)
                ) {
                    log::trace!("Ignoring event kind: {:?}", event.kind);
                    return;
                }
                if event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(filename.as_os_str()))
                {
                    // The debounce thread only exits once this sender is gone.
                    let _ = raw_tx.send(());
                }
            },
            Config::default().with_poll_interval(Duration::from_millis(poll_interval_ms)),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&parent, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", parent.display()))?;
        log::info!("Watching description file {}", canonical.display());

        Ok(Self {
            _watcher: watcher,
            event_receiver: rx,
            path: canonical,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait up to `timeout` for the next change.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DescriptionChanged> {
        match self.event_receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Turn raw file events into one change per burst, sent after `quiet` has
/// passed without another event. Returns when either side hangs up.
fn forward_settled(
    raw: Receiver<()>,
    changes: Sender<DescriptionChanged>,
    path: PathBuf,
    quiet: Duration,
) {
    while raw.recv().is_ok() {
        loop {
            match raw.recv_timeout(quiet) {
                Ok(()) => log::trace!("Debouncing description change"),
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
        log::info!("Description file changed: {}", path.display());
        if changes
            .send(DescriptionChanged { path: path.clone() })
            .is_err()
        {
            return;
        }
    }
}
