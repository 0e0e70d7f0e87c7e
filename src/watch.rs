//! Save bridge: turns filesystem writes inside a working copy into save events.

use crate::error::ApiError;
use notify::event::{CreateKind, ModifyKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing::error;

/// A document was written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    pub path: PathBuf,
}

/// Watches one working-copy directory.
pub struct SaveWatcher {
    root: PathBuf,
}

impl SaveWatcher {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Start watching; events arrive on the returned channel while the watcher lives.
    pub fn watch(
        &self,
    ) -> Result<(mpsc::Receiver<notify::Result<Event>>, RecommendedWatcher), ApiError> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            if let Err(e) = tx.send(res) {
                error!("Error sending watch event: {}", e);
            }
        })
        .map_err(|e| ApiError::IoError(std::io::Error::other(format!(
            "Failed to create watcher: {}",
            e
        ))))?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|e| {
                ApiError::IoError(std::io::Error::other(format!(
                    "Failed to watch {}: {}",
                    self.root.display(),
                    e
                )))
            })?;

        Ok((rx, watcher))
    }

    /// Save events carried by a raw notify event.
    pub fn save_events(event: &Event) -> Vec<SaveEvent> {
        let is_write = matches!(
            event.kind,
            EventKind::Modify(ModifyKind::Data(_))
                | EventKind::Modify(ModifyKind::Any)
                | EventKind::Modify(ModifyKind::Name(_))
                | EventKind::Create(CreateKind::File)
                | EventKind::Create(CreateKind::Any)
        );
        if !is_write {
            return Vec::new();
        }

        event
            .paths
            .iter()
            .filter(|path| path.is_file())
            .map(|path| SaveEvent { path: path.clone() })
            .collect()
    }
}

/// Coalesces filesystem notifications into save events.
///
/// One editor save usually raises several notify events (create, data,
/// rename of a swap file). The filter remembers the text last handed to the
/// synchronizer per document and drops follow-up events whose text is the
/// same. Each save that reaches the synchronizer is pushed unconditionally.
#[derive(Debug, Default)]
pub struct SaveFilter {
    last: HashMap<PathBuf, String>,
}

impl SaveFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` as already in sync for `path`.
    pub fn seed(&mut self, path: &Path, text: &str) {
        self.last.insert(path.to_path_buf(), text.to_string());
    }

    /// True (and recorded) when `text` differs from what was last seen for `path`.
    pub fn changed(&mut self, path: &Path, text: &str) -> bool {
        if self.last.get(path).map(String::as_str) == Some(text) {
            return false;
        }
        self.seed(path, text);
        true
    }
}
