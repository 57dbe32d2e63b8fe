//! File-system watching
//!
//! [`FileWatcher`] turns native notifications into [`WatchEvent`]s on a tokio
//! channel. Only JSON files are forwarded; deciding which of them matter is
//! left to the registry.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RenameMode};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::{ScoutError, ScoutResult};
use scout_model::WatchEvent;

/// Keeps native watches alive; dropping it stops the event stream.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch every root recursively, sending translated events on `sender`.
    ///
    /// The notifier thread blocks while `sender` is full.
    pub fn start(roots: &[PathBuf], sender: mpsc::Sender<WatchEvent>) -> ScoutResult<Self> {
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for translated in translate(&event) {
                        if sender.blocking_send(translated).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => warn!("File watcher error: {}", e),
            },
            NotifyConfig::default(),
        )
        .map_err(|e| ScoutError::Watch(format!("watcher init failed: {}", e)))?;

        for root in roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| ScoutError::Watch(format!("failed to watch {}: {}", root.display(), e)))?;
            debug!("Watching {}", root.display());
        }

        Ok(Self { _watcher: watcher })
    }
}

/// Map a native notification onto zero or more [`WatchEvent`]s.
///
/// Renames become a deletion of the old path and a creation of the new one.
fn translate(event: &Event) -> Vec<WatchEvent> {
    let json_paths = || event.paths.iter().filter(|p| is_json(p));

    match &event.kind {
        EventKind::Create(_) => json_paths().map(WatchEvent::created).collect(),
        EventKind::Remove(_) => json_paths().map(WatchEvent::deleted).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => json_paths().map(WatchEvent::deleted).collect(),
            RenameMode::To => json_paths().map(WatchEvent::created).collect(),
            RenameMode::Both => {
                let mut events = Vec::new();
                if let Some(from) = event.paths.first().filter(|p| is_json(p)) {
                    events.push(WatchEvent::deleted(from));
                }
                if let Some(to) = event.paths.get(1).filter(|p| is_json(p)) {
                    events.push(WatchEvent::created(to));
                }
                events
            }
            // The backend could not tell which side of the rename this is.
            _ => json_paths()
                .map(|p| {
                    if p.exists() {
                        WatchEvent::created(p)
                    } else {
                        WatchEvent::deleted(p)
                    }
                })
                .collect(),
        },
        EventKind::Modify(_) => json_paths().map(WatchEvent::modified).collect(),
        _ => Vec::new(),
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, RemoveKind};
    use scout_model::WatchEventKind;

    #[test]
    fn translates_basic_kinds() {
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path("/ws/manifest.json".into());
        assert_eq!(translate(&create), vec![WatchEvent::created("/ws/manifest.json")]);

        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path("/ws/service.json".into());
        assert_eq!(translate(&modify), vec![WatchEvent::modified("/ws/service.json")]);

        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path("/ws/manifest.json".into());
        assert_eq!(translate(&remove)[0].kind, WatchEventKind::Deleted);
    }

    #[test]
    fn ignores_non_json_files() {
        let event = Event::new(EventKind::Create(CreateKind::File)).add_path("/ws/react/Foo.tsx".into());
        assert!(translate(&event).is_empty());
    }

    #[test]
    fn rename_becomes_delete_and_create() {
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path("/ws/old/manifest.json".into())
            .add_path("/ws/new/manifest.json".into());
        assert_eq!(
            translate(&event),
            vec![
                WatchEvent::deleted("/ws/old/manifest.json"),
                WatchEvent::created("/ws/new/manifest.json"),
            ]
        );
    }

    #[tokio::test]
    async fn watching_a_missing_root_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (sender, _receiver) = mpsc::channel(1);
        let result = FileWatcher::start(&[temp_dir.path().join("missing")], sender);
        assert!(matches!(result, Err(ScoutError::Watch(_))));
    }
}
