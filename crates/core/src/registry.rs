//! Multi-project registry
//!
//! [`ProjectRegistry`] owns every discovered [`ProjectRecord`] across one or
//! more workspace roots. It is the only long-lived mutable state of the engine
//! and the single place where the "one record per root path" invariant is
//! enforced.
//!
//! ## Concurrency
//!
//! - Full scans run root scans concurrently (bounded by a semaphore) and swap
//!   the result in under one write lock. A scan that finishes after a newer
//!   one has been applied is discarded.
//! - `add`/`refresh`/`remove` take a per-root async lock, so two operations on
//!   the same root never interleave, while different roots proceed in parallel.
//! - Readers (`resolve_owner`, `all_projects`) only take the read lock and get
//!   clones back.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, RwLock, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::configs::workspace::WorkspaceConfig;
use crate::fs::{PathFilter, WorkspaceFs, DISCOVERY_EXCLUDED_DIRS};
use crate::results::{RegistryChange, WorkspaceSnapshot};
use crate::scanner::ProjectScanner;
use crate::types::ScoutResult;
use scout_model::{ProjectRecord, WatchEvent, WatchEventKind};

/// Directory holding per-block data-schema documents, relative to a project root.
const SCHEMA_DIR_SUFFIX: &[&str] = &["public", "metadata", "schemas"];

/// Registry update a file-change event maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    Add(PathBuf),
    Refresh(PathBuf),
    Remove(PathBuf),
}

impl EventAction {
    /// Root path the action targets.
    pub fn root(&self) -> &Path {
        match self {
            Self::Add(root) | Self::Refresh(root) | Self::Remove(root) => root,
        }
    }
}

#[derive(Default)]
struct RegistryState {
    roots: Vec<PathBuf>,
    projects: HashMap<PathBuf, ProjectRecord>,
    /// Generation of the full scan currently applied.
    generation: u64,
}

/// Live set of discovered projects.
pub struct ProjectRegistry {
    scanner: ProjectScanner,
    fs: Arc<dyn WorkspaceFs>,
    discovery: PathFilter,
    max_concurrent_scans: usize,
    state: RwLock<RegistryState>,
    path_locks: StdMutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
    next_generation: AtomicU64,
}

impl ProjectRegistry {
    /// Create an empty registry. Nothing is scanned until [`scan_workspace`](Self::scan_workspace).
    pub fn new(fs: Arc<dyn WorkspaceFs>, config: &WorkspaceConfig) -> ScoutResult<Self> {
        let scanner = ProjectScanner::new(fs.clone(), config)?;
        let discovery = PathFilter::new(
            [format!("**/{}", config.marker_file())],
            config.excludes(),
            DISCOVERY_EXCLUDED_DIRS,
        )?;

        Ok(Self {
            scanner,
            fs,
            discovery,
            max_concurrent_scans: config.max_concurrent_scans(),
            state: RwLock::new(RegistryState::default()),
            path_locks: StdMutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        })
    }

    /// Rebuild the registry from scratch for the given workspace roots.
    ///
    /// Every root is scanned, then every marker file anywhere below the roots
    /// (outside excluded directories) is scanned as a nested project. A root
    /// that fails to scan is simply absent from the result.
    pub async fn scan_workspace(&self, roots: Vec<PathBuf>) -> WorkspaceSnapshot {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let roots = dedup_roots(roots);
        info!("Scanning {} workspace root(s)", roots.len());

        let shared_roots = Arc::new(roots.clone());
        let mut projects: HashMap<PathBuf, ProjectRecord> = HashMap::new();

        for record in self.scan_many(roots.clone(), shared_roots.clone()).await {
            projects.insert(record.root_path.clone(), record);
        }

        // Roots were already attempted, registered or not.
        let mut nested = BTreeSet::new();
        for root in &roots {
            for dir in self.find_project_dirs(root).await {
                if !roots.contains(&dir) && !projects.contains_key(&dir) {
                    nested.insert(dir);
                }
            }
        }
        if !nested.is_empty() {
            debug!("Found {} nested project candidate(s)", nested.len());
        }
        for record in self
            .scan_many(nested.into_iter().collect(), shared_roots)
            .await
        {
            projects
                .entry(record.root_path.clone())
                .or_insert(record);
        }

        let mut state = self.state.write().await;
        if generation > state.generation {
            info!("Scan complete. Found {} project(s)", projects.len());
            state.roots = roots;
            state.projects = projects;
            state.generation = generation;
        } else {
            debug!(
                "Discarding scan #{}: scan #{} was applied first",
                generation, state.generation
            );
        }
        snapshot_of(&state)
    }

    /// The registered project whose root is the longest prefix of `file`.
    ///
    /// Prefixes are compared by whole path components, not as raw strings:
    /// `/ws/app` owns `/ws/app/react/Foo.tsx` but not `/ws/app-two/manifest.json`,
    /// even though the latter starts with the string `/ws/app`.
    pub async fn resolve_owner(&self, file: &Path) -> Option<ProjectRecord> {
        let state = self.state.read().await;
        state
            .projects
            .values()
            .filter(|record| file.starts_with(&record.root_path))
            .max_by_key(|record| record.root_path.as_os_str().len())
            .cloned()
    }

    /// Re-scan `root`, replacing whatever was registered for it.
    pub async fn refresh(&self, root: &Path) -> RegistryChange {
        debug!("Refreshing project at {}", root.display());
        self.rescan(root).await
    }

    /// Scan a newly created project root and register it.
    pub async fn add(&self, root: &Path) -> RegistryChange {
        debug!("Adding project at {}", root.display());
        self.rescan(root).await
    }

    /// Drop the record for `root`. Returns whether one was registered.
    pub async fn remove(&self, root: &Path) -> bool {
        let lock = self.path_lock(root);
        let removed = {
            let _guard = lock.lock().await;
            self.state.write().await.projects.remove(root).is_some()
        };
        self.release_path_lock(root, lock);

        if removed {
            info!("Removed project at {}", root.display());
        }
        removed
    }

    /// Snapshot of every registered project, sorted by root path.
    pub async fn all_projects(&self) -> Vec<ProjectRecord> {
        let state = self.state.read().await;
        sorted_records(&state)
    }

    pub async fn get(&self, root: &Path) -> Option<ProjectRecord> {
        self.state.read().await.projects.get(root).cloned()
    }

    pub async fn roots(&self) -> Vec<PathBuf> {
        self.state.read().await.roots.clone()
    }

    pub async fn snapshot(&self) -> WorkspaceSnapshot {
        let state = self.state.read().await;
        snapshot_of(&state)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.projects.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.projects.is_empty()
    }

    /// Map a file-change event onto the registry update it calls for.
    ///
    /// Marker files drive add/refresh/remove of their directory; service
    /// descriptors refresh their directory; data-schema files refresh the
    /// project that owns them. Everything else is ignored.
    pub async fn action_for(&self, event: &WatchEvent) -> Option<EventAction> {
        let file_name = event.path.file_name()?.to_str()?;
        let parent = event.path.parent()?.to_path_buf();

        if self.is_excluded(&event.path).await {
            return None;
        }

        if file_name == self.scanner.marker_file() {
            return Some(match event.kind {
                WatchEventKind::Created => EventAction::Add(parent),
                WatchEventKind::Modified => EventAction::Refresh(parent),
                WatchEventKind::Deleted => EventAction::Remove(parent),
            });
        }

        if file_name == self.scanner.service_file() {
            return Some(EventAction::Refresh(parent));
        }

        if is_schema_file(&event.path, file_name) {
            let owner = self.resolve_owner(&event.path).await?;
            return Some(EventAction::Refresh(owner.root_path));
        }

        None
    }

    /// Run an [`EventAction`] to completion.
    pub async fn apply(&self, action: EventAction) -> RegistryChange {
        match action {
            EventAction::Add(root) => self.add(&root).await,
            EventAction::Refresh(root) => self.refresh(&root).await,
            EventAction::Remove(root) => {
                if self.remove(&root).await {
                    RegistryChange::Removed(root)
                } else {
                    RegistryChange::Unchanged(root)
                }
            }
        }
    }

    /// Apply a single file-change event. `None` when the event is irrelevant.
    pub async fn handle_event(&self, event: &WatchEvent) -> Option<RegistryChange> {
        let action = self.action_for(event).await?;
        Some(self.apply(action).await)
    }

    async fn rescan(&self, root: &Path) -> RegistryChange {
        let lock = self.path_lock(root);
        let change = {
            let _guard = lock.lock().await;
            let roots = self.roots().await;
            let record = self.scanner.scan_root(root, &roots).await;

            // Remove and insert under one write lock so readers never see the gap.
            let mut state = self.state.write().await;
            let previous = state.projects.remove(root);
            match (previous, record) {
                (Some(_), Some(record)) => {
                    state.projects.insert(root.to_path_buf(), record.clone());
                    RegistryChange::Refreshed(Box::new(record))
                }
                (None, Some(record)) => {
                    state.projects.insert(root.to_path_buf(), record.clone());
                    RegistryChange::Added(Box::new(record))
                }
                (Some(_), None) => RegistryChange::Removed(root.to_path_buf()),
                (None, None) => RegistryChange::Unchanged(root.to_path_buf()),
            }
        };
        self.release_path_lock(root, lock);
        change
    }

    async fn scan_many(
        &self,
        dirs: Vec<PathBuf>,
        workspace_roots: Arc<Vec<PathBuf>>,
    ) -> Vec<ProjectRecord> {
        let permits = Arc::new(Semaphore::new(self.max_concurrent_scans));
        let mut tasks = JoinSet::new();

        for dir in dirs {
            let scanner = self.scanner.clone();
            let permits = permits.clone();
            let workspace_roots = workspace_roots.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                scanner.scan_root(&dir, &workspace_roots).await
            });
        }

        let mut records = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!("Project scan task failed: {}", e),
            }
        }
        records
    }

    /// Directories under `root` that hold a marker file.
    async fn find_project_dirs(&self, root: &Path) -> Vec<PathBuf> {
        match self.fs.find_files(root, &self.discovery).await {
            Ok(markers) => markers
                .into_iter()
                .filter_map(|marker| marker.parent().map(Path::to_path_buf))
                .collect(),
            Err(e) => {
                warn!(
                    "Failed to search {} for nested projects: {}",
                    root.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    async fn is_excluded(&self, path: &Path) -> bool {
        let roots = self.roots().await;
        let relative = roots
            .iter()
            .filter_map(|root| path.strip_prefix(root).ok())
            .min_by_key(|relative| relative.as_os_str().len())
            .unwrap_or(path);
        self.discovery.is_excluded(relative)
    }

    fn path_lock(&self, root: &Path) -> Arc<Mutex<()>> {
        let mut locks = self
            .path_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(root.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Forget the lock for `root` once no other operation holds or awaits it.
    fn release_path_lock(&self, root: &Path, lock: Arc<Mutex<()>>) {
        let mut locks = self
            .path_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one held here.
        if Arc::strong_count(&lock) <= 2 {
            locks.remove(root);
        }
    }
}

fn dedup_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = BTreeSet::new();
    roots
        .into_iter()
        .filter(|root| seen.insert(root.clone()))
        .collect()
}

fn is_schema_file(path: &Path, file_name: &str) -> bool {
    if file_name == "schema.json" {
        return true;
    }
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let parent_tail: Vec<_> = path
        .parent()
        .map(|p| {
            p.components()
                .rev()
                .take(SCHEMA_DIR_SUFFIX.len())
                .filter_map(|c| c.as_os_str().to_str())
                .collect()
        })
        .unwrap_or_default();
    is_json
        && parent_tail
            .iter()
            .rev()
            .copied()
            .eq(SCHEMA_DIR_SUFFIX.iter().copied())
}

fn sorted_records(state: &RegistryState) -> Vec<ProjectRecord> {
    let mut records: Vec<_> = state.projects.values().cloned().collect();
    records.sort_by(|a, b| a.root_path.cmp(&b.root_path));
    records
}

fn snapshot_of(state: &RegistryState) -> WorkspaceSnapshot {
    WorkspaceSnapshot {
        roots: state.roots.clone(),
        projects: sorted_records(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use async_trait::async_trait;
    use scout_model::ProjectType;
    use std::fs;
    use std::io;
    use std::sync::atomic::AtomicBool;
    use std::time::SystemTime;
    use tokio::sync::Notify;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn manifest(name: &str, builder: &str) -> String {
        format!(
            r#"{{"vendor": "acme", "name": "{}", "version": "1.0.0", "builders": {{"{}": "1.x"}}}}"#,
            name, builder
        )
    }

    fn registry() -> ProjectRegistry {
        registry_with(WorkspaceConfig::default())
    }

    fn registry_with(config: WorkspaceConfig) -> ProjectRegistry {
        ProjectRegistry::new(Arc::new(LocalFs::default()), &config).unwrap()
    }

    /// Local disk with one unreadable file and an optional one-time pause after a read.
    #[derive(Default)]
    struct ScriptedFs {
        inner: LocalFs,
        denied: Option<PathBuf>,
        paused: Option<PathBuf>,
        pause_armed: AtomicBool,
        entered: Notify,
        resume: Notify,
        reads: StdMutex<HashMap<PathBuf, usize>>,
    }

    impl ScriptedFs {
        fn reads_of(&self, path: &Path) -> usize {
            self.reads.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl WorkspaceFs for ScriptedFs {
        async fn exists(&self, path: &Path) -> bool {
            self.inner.exists(path).await
        }

        async fn is_dir(&self, path: &Path) -> bool {
            self.inner.is_dir(path).await
        }

        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            {
                let mut reads = self.reads.lock().unwrap();
                *reads.entry(path.to_path_buf()).or_insert(0) += 1;
            }
            if self.denied.as_deref() == Some(path) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "access denied"));
            }
            let content = self.inner.read_to_string(path).await?;
            if self.paused.as_deref() == Some(path) && self.pause_armed.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.resume.notified().await;
            }
            Ok(content)
        }

        async fn modified_at(&self, path: &Path) -> io::Result<SystemTime> {
            self.inner.modified_at(path).await
        }

        async fn find_files(&self, root: &Path, filter: &PathFilter) -> io::Result<Vec<PathBuf>> {
            self.inner.find_files(root, filter).await
        }
    }

    #[tokio::test]
    async fn scan_finds_roots_and_nested_projects() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        write(&ws.join("manifest.json"), &manifest("theme", "store"));
        write(&ws.join("backend/manifest.json"), &manifest("api", "node"));
        write(&ws.join("apps/deep/shelf/manifest.json"), &manifest("shelf", "react"));
        write(&ws.join("node_modules/pkg/manifest.json"), &manifest("dep", "react"));
        write(&ws.join(".git/manifest.json"), &manifest("git", "react"));
        write(&ws.join("dist/manifest.json"), &manifest("dist", "react"));

        let snapshot = registry().scan_workspace(vec![ws.clone()]).await;

        let roots: Vec<_> = snapshot
            .projects
            .iter()
            .map(|p| p.root_path.clone())
            .collect();
        assert_eq!(
            roots,
            vec![ws.clone(), ws.join("apps/deep/shelf"), ws.join("backend")]
        );
        assert_eq!(snapshot.roots, vec![ws]);
        assert!(snapshot.is_multi_project());
    }

    #[tokio::test]
    async fn configured_excludes_skip_nested_projects() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        write(&ws.join("app/manifest.json"), &manifest("app", "react"));
        write(&ws.join("fixtures/old/manifest.json"), &manifest("old", "react"));

        let registry = registry_with(WorkspaceConfig {
            excludes: Some(vec!["fixtures/**".to_string()]),
            ..WorkspaceConfig::default()
        });
        let snapshot = registry.scan_workspace(vec![ws.clone()]).await;

        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.projects[0].root_path, ws.join("app"));
    }

    #[tokio::test]
    async fn malformed_manifest_is_isolated() {
        let temp_dir = tempfile::tempdir().unwrap();
        let good = temp_dir.path().join("good");
        let bad = temp_dir.path().join("bad");
        let other = temp_dir.path().join("other");
        write(&good.join("manifest.json"), &manifest("good", "react"));
        write(&bad.join("manifest.json"), "{ this is not json");
        write(&other.join("manifest.json"), &manifest("other", "node"));

        let registry = registry();
        let snapshot = registry
            .scan_workspace(vec![good.clone(), bad.clone(), other.clone()])
            .await;

        assert_eq!(snapshot.projects.len(), 2);
        assert!(registry.get(&good).await.is_some());
        assert!(registry.get(&other).await.is_some());
        assert!(registry.get(&bad).await.is_none());
    }

    #[tokio::test]
    async fn unreadable_manifest_leaves_other_roots_registered() {
        let temp_dir = tempfile::tempdir().unwrap();
        let locked = temp_dir.path().join("locked");
        let open = temp_dir.path().join("open");
        write(&locked.join("manifest.json"), &manifest("locked", "react"));
        write(&open.join("manifest.json"), &manifest("open", "node"));

        let fs = Arc::new(ScriptedFs {
            denied: Some(locked.join("manifest.json")),
            ..ScriptedFs::default()
        });
        let registry = ProjectRegistry::new(fs.clone(), &WorkspaceConfig::default()).unwrap();
        let snapshot = registry
            .scan_workspace(vec![locked.clone(), open.clone()])
            .await;

        let roots: Vec<_> = snapshot.projects.iter().map(|p| p.root_path.clone()).collect();
        assert_eq!(roots, vec![open]);
        assert!(registry.get(&locked).await.is_none());
    }

    #[tokio::test]
    async fn failed_root_is_not_rescanned_as_nested_project() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        write(&ws.join("manifest.json"), "{\"builders\": ");
        write(&ws.join("api/manifest.json"), &manifest("api", "node"));

        let fs = Arc::new(ScriptedFs::default());
        let registry = ProjectRegistry::new(fs.clone(), &WorkspaceConfig::default()).unwrap();
        let snapshot = registry.scan_workspace(vec![ws.clone()]).await;

        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.projects[0].root_path, ws.join("api"));
        assert_eq!(
            fs.reads_of(&ws.join("manifest.json")),
            1,
            "broken root manifest should be read once per scan"
        );
    }

    #[tokio::test]
    async fn scan_finishing_after_newer_scan_is_discarded() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        let marker = ws.join("manifest.json");
        write(&marker, &manifest("theme", "store"));

        let fs = Arc::new(ScriptedFs {
            paused: Some(marker.clone()),
            pause_armed: AtomicBool::new(true),
            ..ScriptedFs::default()
        });
        let registry = Arc::new(
            ProjectRegistry::new(fs.clone(), &WorkspaceConfig::default()).unwrap(),
        );

        // The first scan reads the old manifest, then stalls.
        let first = tokio::spawn({
            let registry = registry.clone();
            let roots = vec![ws.clone()];
            async move { registry.scan_workspace(roots).await }
        });
        fs.entered.notified().await;

        write(&marker, &manifest("theme", "react"));
        let second = registry.scan_workspace(vec![ws.clone()]).await;
        assert_eq!(second.projects[0].project_type, ProjectType::ReactApp);

        fs.resume.notify_one();
        let stale = first.await.unwrap();

        assert_eq!(stale.projects[0].project_type, ProjectType::ReactApp);
        assert_eq!(
            registry.get(&ws).await.unwrap().project_type,
            ProjectType::ReactApp,
            "older scan must not overwrite the newer one"
        );
    }

    #[tokio::test]
    async fn resolve_owner_prefers_longest_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let a = temp_dir.path().join("a");
        write(&a.join("manifest.json"), &manifest("a", "store"));
        write(&a.join("b/manifest.json"), &manifest("b", "node"));
        write(&a.join("b/c/manifest.json"), &manifest("c", "react"));

        let registry = registry();
        registry.scan_workspace(vec![a.clone()]).await;
        assert_eq!(registry.len().await, 3);

        let owner = registry.resolve_owner(&a.join("b/c/x.ts")).await.unwrap();
        assert_eq!(owner.root_path, a.join("b/c"));

        let owner = registry.resolve_owner(&a.join("b/y.ts")).await.unwrap();
        assert_eq!(owner.root_path, a.join("b"));

        let owner = registry.resolve_owner(&a.join("z.ts")).await.unwrap();
        assert_eq!(owner.root_path, a);

        assert!(registry
            .resolve_owner(&temp_dir.path().join("elsewhere/x.ts"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn resolve_owner_does_not_match_sibling_with_shared_prefix() {
        let temp_dir = tempfile::tempdir().unwrap();
        let app = temp_dir.path().join("app");
        write(&app.join("manifest.json"), &manifest("app", "react"));

        let registry = registry();
        registry.scan_workspace(vec![temp_dir.path().to_path_buf()]).await;

        assert!(registry
            .resolve_owner(&temp_dir.path().join("app-two/react/Foo.tsx"))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn refresh_reflects_new_project_type() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        write(&root.join("manifest.json"), &manifest("shop", "react"));

        let registry = registry();
        registry.scan_workspace(vec![root.clone()]).await;
        let file = root.join("react/Foo.tsx");
        assert_eq!(
            registry.resolve_owner(&file).await.unwrap().project_type,
            ProjectType::ReactApp
        );

        write(&root.join("manifest.json"), &manifest("shop", "store"));
        let change = registry.refresh(&root).await;
        assert!(matches!(change, RegistryChange::Refreshed(_)));

        assert_eq!(
            registry.resolve_owner(&file).await.unwrap().project_type,
            ProjectType::StoreTheme
        );
        assert_eq!(registry.len().await, 1, "refresh overwrites, never duplicates");
    }

    #[tokio::test]
    async fn refresh_of_broken_manifest_drops_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        write(&root.join("manifest.json"), &manifest("shop", "react"));

        let registry = registry();
        registry.scan_workspace(vec![root.clone()]).await;

        write(&root.join("manifest.json"), "{");
        let change = registry.refresh(&root).await;
        assert_eq!(change, RegistryChange::Removed(root.clone()));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn add_then_remove_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        let registry = registry();
        registry.scan_workspace(vec![ws.clone()]).await;
        assert!(registry.is_empty().await);

        let root = ws.join("new-app");
        write(&root.join("manifest.json"), &manifest("new-app", "pixel"));
        let change = registry.add(&root).await;
        assert_eq!(change.root_path(), root.as_path());
        assert_eq!(
            change.record().map(|r| r.project_type),
            Some(ProjectType::PixelApp)
        );

        assert!(registry.remove(&root).await);
        assert!(registry
            .all_projects()
            .await
            .iter()
            .all(|p| p.root_path != root));
        assert!(!registry.remove(&root).await, "second remove is a no-op");
    }

    #[tokio::test]
    async fn add_without_marker_changes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = registry();

        let change = registry.add(temp_dir.path()).await;
        assert_eq!(change, RegistryChange::Unchanged(temp_dir.path().to_path_buf()));
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn concurrent_operations_on_same_root_keep_one_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        write(&root.join("manifest.json"), &manifest("shop", "react"));

        let registry = Arc::new(registry());
        registry.scan_workspace(vec![root.clone()]).await;

        let mut tasks = JoinSet::new();
        for i in 0..16 {
            let registry = registry.clone();
            let root = root.clone();
            tasks.spawn(async move {
                if i % 2 == 0 {
                    registry.refresh(&root).await;
                } else {
                    registry.add(&root).await;
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        assert_eq!(registry.len().await, 1);
        assert!(
            registry.path_locks.lock().unwrap().is_empty(),
            "path locks are released once idle"
        );
    }

    #[tokio::test]
    async fn full_rescan_replaces_previous_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        write(&first.join("manifest.json"), &manifest("first", "react"));
        write(&second.join("manifest.json"), &manifest("second", "react"));

        let registry = registry();
        registry.scan_workspace(vec![first.clone()]).await;
        let snapshot = registry.scan_workspace(vec![second.clone()]).await;

        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.projects[0].root_path, second);
        assert_eq!(registry.roots().await, vec![second]);
    }

    #[tokio::test]
    async fn events_map_to_registry_actions() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        write(&ws.join("shop/manifest.json"), &manifest("shop", "react"));

        let registry = registry();
        registry.scan_workspace(vec![ws.clone()]).await;
        let shop = ws.join("shop");

        assert_eq!(
            registry
                .action_for(&WatchEvent::created(ws.join("api/manifest.json")))
                .await,
            Some(EventAction::Add(ws.join("api")))
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::modified(shop.join("manifest.json")))
                .await,
            Some(EventAction::Refresh(shop.clone()))
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::deleted(shop.join("manifest.json")))
                .await,
            Some(EventAction::Remove(shop.clone()))
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::deleted(shop.join("service.json")))
                .await,
            Some(EventAction::Refresh(shop.clone()))
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::modified(
                    shop.join("public/metadata/schemas/banner.json")
                ))
                .await,
            Some(EventAction::Refresh(shop.clone()))
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::modified(shop.join("react/Foo.tsx")))
                .await,
            None
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::created(
                    shop.join("node_modules/x/manifest.json")
                ))
                .await,
            None
        );
        assert_eq!(
            registry
                .action_for(&WatchEvent::modified(ws.join("orphan/schema.json")))
                .await,
            None,
            "schema files outside any project are ignored"
        );
    }

    #[tokio::test]
    async fn handle_event_applies_marker_lifecycle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let ws = temp_dir.path().to_path_buf();
        let registry = registry();
        registry.scan_workspace(vec![ws.clone()]).await;

        let marker = ws.join("api/manifest.json");
        write(&marker, &manifest("api", "node"));
        let change = registry
            .handle_event(&WatchEvent::created(&marker))
            .await
            .unwrap();
        assert!(matches!(change, RegistryChange::Added(_)));

        fs::remove_file(&marker).unwrap();
        let change = registry
            .handle_event(&WatchEvent::deleted(&marker))
            .await
            .unwrap();
        assert_eq!(change, RegistryChange::Removed(ws.join("api")));
        assert!(registry.is_empty().await);
    }

    #[test]
    fn schema_file_detection() {
        let p = Path::new("/ws/app/public/metadata/schemas/banner.json");
        assert!(is_schema_file(p, "banner.json"));
        let p = Path::new("/ws/app/public/metadata/banner.json");
        assert!(!is_schema_file(p, "banner.json"));
        let p = Path::new("/ws/app/schema.json");
        assert!(is_schema_file(p, "schema.json"));
        let p = Path::new("/ws/app/public/metadata/schemas/notes.txt");
        assert!(!is_schema_file(p, "notes.txt"));
    }
}
