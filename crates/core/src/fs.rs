//! File-system capabilities the engine consumes from its host.
//!
//! The engine never touches the disk directly; every existence check, read and
//! listing goes through [`WorkspaceFs`]. [`LocalFs`] implements it on top of
//! `tokio::fs` with a per-call timeout so no operation can hang forever.

use std::collections::{BTreeSet, VecDeque};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::types::{ScoutError, ScoutResult};

/// Dependency-cache and build-output directories that are never walked.
pub const BUILD_OUTPUT_DIRS: &[&str] = &["node_modules", "dist", "build"];

/// Directories skipped during nested project discovery.
pub const DISCOVERY_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build"];

/// Include/exclude rules for a recursive listing.
///
/// Glob patterns are matched against paths relative to the listing root, with
/// `*` not crossing directory separators. Directories whose name is in
/// `excluded_dirs` are pruned without being entered.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: GlobSet,
    exclude: GlobSet,
    excluded_dirs: BTreeSet<String>,
}

impl PathFilter {
    pub fn new<I, E>(includes: I, excludes: E, excluded_dirs: &[&str]) -> ScoutResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        Ok(Self {
            include: build_glob_set(includes)?,
            exclude: build_glob_set(excludes)?,
            excluded_dirs: excluded_dirs.iter().map(|d| d.to_string()).collect(),
        })
    }

    /// Whether `relative` lies inside an excluded directory or matches an exclude glob.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let in_excluded_dir = relative.components().any(|c| {
            c.as_os_str()
                .to_str()
                .is_some_and(|name| self.excluded_dirs.contains(name))
        });
        in_excluded_dir || self.exclude.is_match(relative)
    }

    fn prunes_dir(&self, relative: &Path) -> bool {
        let by_name = relative
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.excluded_dirs.contains(name));
        by_name || self.exclude.is_match(relative)
    }

    fn accepts_file(&self, relative: &Path) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }
}

fn build_glob_set<I>(patterns: I) -> ScoutResult<GlobSet>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| ScoutError::Config(format!("Invalid glob '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| ScoutError::Config(format!("Failed to build glob set: {}", e)))
}

/// Host file-system capabilities used by the scanner and registry.
#[async_trait]
pub trait WorkspaceFs: Send + Sync {
    /// Whether anything exists at `path`. Never fails; errors count as absent.
    async fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory. Never fails.
    async fn is_dir(&self, path: &Path) -> bool;

    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    async fn modified_at(&self, path: &Path) -> io::Result<SystemTime>;

    /// Recursively list files under `root` accepted by `filter`, sorted by path.
    async fn find_files(&self, root: &Path, filter: &PathFilter) -> io::Result<Vec<PathBuf>>;
}

/// [`WorkspaceFs`] backed by the local disk.
#[derive(Debug, Clone)]
pub struct LocalFs {
    io_timeout: Duration,
}

impl Default for LocalFs {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl LocalFs {
    pub fn new(io_timeout: Duration) -> Self {
        Self { io_timeout }
    }

    async fn bounded<T, F>(&self, path: &Path, fut: F) -> io::Result<T>
    where
        F: Future<Output = io::Result<T>>,
    {
        match tokio::time::timeout(self.io_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!(
                    "file-system call on {} exceeded {:?}",
                    path.display(),
                    self.io_timeout
                ),
            )),
        }
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.bounded(path, tokio::fs::metadata(path))
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn read_dir_entries(&self, dir: &Path) -> io::Result<Vec<(PathBuf, std::fs::FileType)>> {
        self.bounded(dir, async {
            let mut entries = Vec::new();
            let mut reader = tokio::fs::read_dir(dir).await?;
            while let Some(entry) = reader.next_entry().await? {
                let file_type = entry.file_type().await?;
                entries.push((entry.path(), file_type));
            }
            Ok(entries)
        })
        .await
    }
}

#[async_trait]
impl WorkspaceFs for LocalFs {
    async fn exists(&self, path: &Path) -> bool {
        self.bounded(path, tokio::fs::try_exists(path))
            .await
            .unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        self.bounded(path, tokio::fs::metadata(path))
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.bounded(path, tokio::fs::read_to_string(path)).await
    }

    async fn modified_at(&self, path: &Path) -> io::Result<SystemTime> {
        let metadata = self.bounded(path, tokio::fs::metadata(path)).await?;
        metadata.modified()
    }

    async fn find_files(&self, root: &Path, filter: &PathFilter) -> io::Result<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut queue = VecDeque::new();

        // The root itself must be listable; failures below it only prune that branch.
        let top = self.read_dir_entries(root).await?;
        queue.push_back(top);

        while let Some(entries) = queue.pop_front() {
            for (path, file_type) in entries {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

                if file_type.is_dir() {
                    if filter.prunes_dir(&relative) {
                        continue;
                    }
                    match self.read_dir_entries(&path).await {
                        Ok(children) => queue.push_back(children),
                        Err(e) => debug!("Skipping unreadable directory {}: {}", path.display(), e),
                    }
                    continue;
                }

                // Symlinks are followed for files only, so link cycles cannot trap the walk.
                let is_file = file_type.is_file()
                    || (file_type.is_symlink() && self.is_file(&path).await);
                if is_file && filter.accepts_file(&relative) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[tokio::test]
    async fn find_files_respects_includes_and_pruned_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(&root.join("Foo.tsx"));
        touch(&root.join("nested/deep/Bar.jsx"));
        touch(&root.join("nested/readme.md"));
        touch(&root.join("node_modules/lib/index.js"));
        touch(&root.join("dist/bundle.js"));

        let filter = PathFilter::new(
            ["**/*.{tsx,ts,jsx,js}"],
            std::iter::empty::<&str>(),
            BUILD_OUTPUT_DIRS,
        )
        .unwrap();
        let files = LocalFs::default().find_files(root, &filter).await.unwrap();

        assert_eq!(
            files,
            vec![root.join("Foo.tsx"), root.join("nested/deep/Bar.jsx")]
        );
    }

    #[tokio::test]
    async fn star_does_not_cross_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(&root.join("a.json"));
        touch(&root.join("sub/b.json"));

        let filter = PathFilter::new(["*.json"], std::iter::empty::<&str>(), &[]).unwrap();
        let files = LocalFs::default().find_files(root, &filter).await.unwrap();

        assert_eq!(files, vec![root.join("a.json")]);
    }

    #[tokio::test]
    async fn exclude_globs_drop_matching_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        touch(&root.join("app/manifest.json"));
        touch(&root.join("fixtures/broken/manifest.json"));

        let filter = PathFilter::new(["**/manifest.json"], ["fixtures/**"], &[]).unwrap();
        let files = LocalFs::default().find_files(root, &filter).await.unwrap();

        assert_eq!(files, vec![root.join("app/manifest.json")]);
    }

    #[tokio::test]
    async fn missing_root_is_an_error_but_exists_is_not() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing");
        let fs = LocalFs::default();

        let filter = PathFilter::new(["**"], std::iter::empty::<&str>(), &[]).unwrap();
        let err = fs.find_files(&missing, &filter).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!fs.exists(&missing).await);
        assert!(!fs.is_dir(&missing).await);
        assert!(fs.is_dir(temp_dir.path()).await);
    }

    #[test]
    fn invalid_glob_is_a_config_error() {
        let err = PathFilter::new(["{unclosed"], std::iter::empty::<&str>(), &[]).unwrap_err();
        assert!(matches!(err, ScoutError::Config(_)));
    }
}
