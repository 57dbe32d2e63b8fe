//! Event dispatch
//!
//! [`EventDispatcher`] drains a stream of [`WatchEvent`]s, maps each onto an
//! [`EventAction`] and runs it against the registry. Actions for the same root
//! go through one lane and are applied strictly in arrival order; lanes for
//! different roots run concurrently.
//!
//! A lane only lives while it has queued work. Once its last action is
//! applied the dispatcher closes it, and the next event for that root opens a
//! fresh one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::registry::{EventAction, ProjectRegistry};
use crate::results::RegistryChange;
use scout_model::WatchEvent;

struct Lane {
    sender: mpsc::UnboundedSender<EventAction>,
    /// Actions sent but not yet reported done.
    pending: usize,
}

pub struct EventDispatcher {
    registry: Arc<ProjectRegistry>,
    changes: Option<mpsc::UnboundedSender<RegistryChange>>,
    open_lanes: watch::Sender<usize>,
}

impl EventDispatcher {
    pub fn new(registry: Arc<ProjectRegistry>) -> Self {
        Self {
            registry,
            changes: None,
            open_lanes: watch::channel(0).0,
        }
    }

    /// Report every applied change on `changes`.
    pub fn with_changes(mut self, changes: mpsc::UnboundedSender<RegistryChange>) -> Self {
        self.changes = Some(changes);
        self
    }

    /// Number of lanes currently open.
    pub fn open_lanes(&self) -> watch::Receiver<usize> {
        self.open_lanes.subscribe()
    }

    /// Process events until `events` closes, then wait for every lane to drain.
    pub async fn run(self, mut events: mpsc::Receiver<WatchEvent>) {
        let mut lanes: HashMap<PathBuf, Lane> = HashMap::new();
        let mut tasks = JoinSet::new();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<PathBuf>();

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    let Some(action) = self.registry.action_for(&event).await else {
                        debug!("Ignoring {:?} on {}", event.kind, event.path.display());
                        continue;
                    };
                    self.route(action, &mut lanes, &mut tasks, &done_tx);
                }
                Some(root) = done_rx.recv() => self.finish(&root, &mut lanes),
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!("Event lane failed: {}", e);
                    }
                }
            }
        }

        // Closing the lanes lets each task finish once its queue is empty.
        lanes.clear();
        self.open_lanes.send_replace(0);
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!("Event lane failed: {}", e);
            }
        }
        debug!("Event dispatcher stopped");
    }

    fn route(
        &self,
        action: EventAction,
        lanes: &mut HashMap<PathBuf, Lane>,
        tasks: &mut JoinSet<()>,
        done: &mpsc::UnboundedSender<PathBuf>,
    ) {
        let root = action.root().to_path_buf();
        let action = match lanes.get_mut(&root) {
            Some(lane) => match lane.sender.send(action) {
                Ok(()) => {
                    lane.pending += 1;
                    return;
                }
                Err(mpsc::error::SendError(action)) => {
                    warn!("Event lane for {} closed, restarting it", root.display());
                    action
                }
            },
            None => action,
        };

        let sender = self.spawn_lane(root.clone(), tasks, done.clone());
        if sender.send(action).is_ok() {
            lanes.insert(root, Lane { sender, pending: 1 });
        }
        self.open_lanes.send_replace(lanes.len());
    }

    /// Account for one applied action; close the lane once nothing is queued.
    fn finish(&self, root: &Path, lanes: &mut HashMap<PathBuf, Lane>) {
        let Some(lane) = lanes.get_mut(root) else {
            return;
        };
        lane.pending = lane.pending.saturating_sub(1);
        if lane.pending == 0 {
            // Dropping the sender ends the lane task.
            lanes.remove(root);
            self.open_lanes.send_replace(lanes.len());
        }
    }

    fn spawn_lane(
        &self,
        root: PathBuf,
        tasks: &mut JoinSet<()>,
        done: mpsc::UnboundedSender<PathBuf>,
    ) -> mpsc::UnboundedSender<EventAction> {
        let (sender, mut receiver) = mpsc::unbounded_channel::<EventAction>();
        let registry = self.registry.clone();
        let changes = self.changes.clone();

        tasks.spawn(async move {
            while let Some(action) = receiver.recv().await {
                let change = registry.apply(action).await;
                match &change {
                    RegistryChange::Added(record) => {
                        info!("Project added: {} ({})", record.name, record.project_type)
                    }
                    RegistryChange::Refreshed(record) => {
                        info!("Project refreshed: {} ({})", record.name, record.project_type)
                    }
                    RegistryChange::Removed(root) => {
                        info!("Project removed: {}", root.display())
                    }
                    RegistryChange::Unchanged(root) => {
                        debug!("No project change at {}", root.display())
                    }
                }
                if let Some(changes) = &changes {
                    // A dropped receiver only means nobody is listening any more.
                    let _ = changes.send(change);
                }
                let _ = done.send(root.clone());
            }
        });

        sender
    }
}
