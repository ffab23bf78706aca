//! File watcher for live preview
//!
//! Reports saves of one source file. Bursts of saves are coalesced later by
//! the designer, so the watcher only needs a short debounce of its own.

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

/// Debounce window of the underlying watcher.
const EVENT_DEBOUNCE: Duration = Duration::from_millis(50);

/// Watches a single file through its parent directory
pub struct FileWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    receiver: Receiver<DebounceEventResult>,
    file: PathBuf,
}

impl FileWatcher {
    pub fn new(file: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(EVENT_DEBOUNCE, tx)?;

        // Editors often save by replacing the file, which drops a watch on the file itself.
        let dir = file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _debouncer: debouncer,
            receiver: rx,
            file: file.to_path_buf(),
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Wait up to `timeout` for a change of the watched file.
    pub fn changed(&self, timeout: Duration) -> Result<bool, notify::Error> {
        match self.receiver.recv_timeout(timeout) {
            Ok(Ok(events)) => Ok(events.iter().any(|event| self.matches(&event.path))),
            Ok(Err(e)) => {
                tracing::warn!("Watch error on {}: {}", self.file.display(), e);
                Ok(false)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(notify::Error::generic("file watcher stopped")),
        }
    }

    /// Only the parent directory is watched, so the file name decides.
    fn matches(&self, path: &Path) -> bool {
        path.file_name().is_some() && path.file_name() == self.file.file_name()
    }
}
