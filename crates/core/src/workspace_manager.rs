//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary interface
//! for hosts. It loads configuration, builds the registry on the local disk, runs the
//! initial scan and answers context queries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use scout_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> scout_core::types::ScoutResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_roots: vec![PathBuf::from(".")],
//!     config_path: None,
//! })
//! .await?;
//!
//! // List all projects
//! let projects = manager.list_projects().await;
//!
//! // Context for a file being edited
//! let context = manager.context_for_file(Path::new("react/Foo.tsx")).await;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::configs::workspace::{discover_workspace_config, load_workspace_config, WorkspaceConfig};
use crate::context::{build_context_for_file, build_workspace_summary};
use crate::events::EventDispatcher;
use crate::fs::LocalFs;
use crate::registry::ProjectRegistry;
use crate::results::{RegistryChange, WorkspaceSnapshot};
use crate::types::{ScoutError, ScoutResult};
use crate::watcher::FileWatcher;
use scout_model::ProjectRecord;

const WATCH_CHANNEL_CAPACITY: usize = 256;

/// High-level workspace manager that encapsulates all workspace operations
pub struct WorkspaceManager {
    registry: Arc<ProjectRegistry>,
    workspace_config: WorkspaceConfig,
    workspace_roots: Vec<PathBuf>,
}

/// Configuration for initializing a workspace manager
pub struct WorkspaceManagerConfig {
    pub workspace_roots: Vec<PathBuf>,
    /// Explicit config file; otherwise `.scout/config.yml` is looked up in the roots.
    pub config_path: Option<PathBuf>,
}

/// Live watch session. Dropping it stops watching.
pub struct WatchSession {
    pub changes: mpsc::UnboundedReceiver<RegistryChange>,
    _watcher: FileWatcher,
}

impl WorkspaceManager {
    /// Initialize a manager and run the first full scan.
    pub async fn new(config: WorkspaceManagerConfig) -> ScoutResult<Self> {
        let workspace_roots = Self::resolve_roots(&config.workspace_roots)?;

        let workspace_config = match &config.config_path {
            Some(path) => load_workspace_config(path)?,
            None => discover_workspace_config(&workspace_roots)?,
        };
        debug!("Using workspace config: {:?}", workspace_config);

        let fs = Arc::new(LocalFs::new(workspace_config.io_timeout()));
        let registry = Arc::new(ProjectRegistry::new(fs, &workspace_config)?);
        registry.scan_workspace(workspace_roots.clone()).await;

        Ok(Self {
            registry,
            workspace_config,
            workspace_roots,
        })
    }

    pub fn registry(&self) -> &Arc<ProjectRegistry> {
        &self.registry
    }

    pub fn workspace_config(&self) -> &WorkspaceConfig {
        &self.workspace_config
    }

    pub fn workspace_roots(&self) -> &[PathBuf] {
        &self.workspace_roots
    }

    /// List all projects in the workspace, sorted by root path.
    pub async fn list_projects(&self) -> WorkspaceSnapshot {
        self.registry.snapshot().await
    }

    /// The project owning `file`, if any. Relative paths resolve against the first root.
    pub async fn owner_of(&self, file: &Path) -> Option<ProjectRecord> {
        self.registry.resolve_owner(&self.absolute(file)).await
    }

    /// Full context text for `file`, or `None` when no project owns it.
    pub async fn context_for_file(&self, file: &Path) -> Option<String> {
        let file = self.absolute(file);
        let owner = self.registry.resolve_owner(&file).await?;
        let all_projects = self.registry.all_projects().await;
        Some(build_context_for_file(&owner, &file, &all_projects))
    }

    pub async fn summary(&self) -> String {
        build_workspace_summary(&self.registry.all_projects().await)
    }

    /// Rebuild the registry from scratch.
    pub async fn rescan(&self) -> WorkspaceSnapshot {
        self.registry.scan_workspace(self.workspace_roots.clone()).await
    }

    /// Start watching the workspace roots and keep the registry in sync.
    ///
    /// Must be called inside a tokio runtime.
    pub fn watch(&self) -> ScoutResult<WatchSession> {
        let (event_tx, event_rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        let watcher = FileWatcher::start(&self.workspace_roots, event_tx)?;
        let dispatcher = EventDispatcher::new(self.registry.clone()).with_changes(change_tx);
        tokio::spawn(dispatcher.run(event_rx));
        info!("Watching {} workspace root(s)", self.workspace_roots.len());

        Ok(WatchSession {
            changes: change_rx,
            _watcher: watcher,
        })
    }

    // Private helper methods

    fn resolve_roots(roots: &[PathBuf]) -> ScoutResult<Vec<PathBuf>> {
        if roots.is_empty() {
            return Err(ScoutError::Config(
                "At least one workspace root is required".to_string(),
            ));
        }
        roots
            .iter()
            .map(|root| {
                let canonical =
                    std::fs::canonicalize(root).map_err(|e| ScoutError::from_io(root, e))?;
                if !canonical.is_dir() {
                    return Err(ScoutError::Config(format!(
                        "Workspace root {} is not a directory",
                        root.display()
                    )));
                }
                Ok(canonical)
            })
            .collect()
    }

    fn absolute(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            return std::fs::canonicalize(file).unwrap_or_else(|_| file.to_path_buf());
        }
        match self.workspace_roots.first() {
            Some(root) => {
                let joined = root.join(file);
                std::fs::canonicalize(&joined).unwrap_or(joined)
            }
            None => file.to_path_buf(),
        }
    }
}
