//! File-change messages sent from a host into the registry.
//!
//! A host (an editor, or the local file watcher) emits one [`WatchEvent`] per
//! change to a file it was asked to observe. The registry maps each event onto
//! an add, refresh or remove of the affected project.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchEventKind {
    Created,
    Modified,
    Deleted,
}

/// A single change to a file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    /// Absolute path of the file that changed.
    pub path: PathBuf,
}

impl WatchEvent {
    #[must_use]
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    #[must_use]
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::Created, path)
    }

    #[must_use]
    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::Modified, path)
    }

    #[must_use]
    pub fn deleted(path: impl Into<PathBuf>) -> Self {
        Self::new(WatchEventKind::Deleted, path)
    }
}
