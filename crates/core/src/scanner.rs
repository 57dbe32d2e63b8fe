//! Single-project scanner
//!
//! Given one directory, decides whether it is a project root and, if so,
//! assembles a complete [`ProjectRecord`]: manifest, optional service
//! descriptor, classification and a categorized inventory of the files found in
//! a fixed set of sub-trees.
//!
//! The scanner never looks for nested project roots; that is the registry's job.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::configs::workspace::WorkspaceConfig;
use crate::fs::{PathFilter, WorkspaceFs, BUILD_OUTPUT_DIRS};
use crate::reader::{read_data_schema, read_manifest, read_service_config};
use crate::types::{ScoutError, ScoutResult};
use scout_model::{FileCategory, InventoryEntry, ProjectRecord, SchemaDocument};

/// A sub-tree of a project root whose files are inventoried under one category.
struct Subtree {
    dir: &'static str,
    patterns: &'static [&'static str],
    category: FileCategory,
}

const SUBTREES: &[Subtree] = &[
    Subtree {
        dir: "react",
        patterns: &["**/*.{tsx,ts,jsx,js}"],
        category: FileCategory::UiComponent,
    },
    Subtree {
        dir: "graphql",
        patterns: &["**/*.{gql,graphql}"],
        category: FileCategory::ApiSchema,
    },
    Subtree {
        dir: "node",
        patterns: &["**/*.{ts,js}"],
        category: FileCategory::ServiceFile,
    },
    Subtree {
        dir: "public/metadata/schemas",
        patterns: &["*.json"],
        category: FileCategory::Schema,
    },
];

/// Single data-schema files looked up directly under the project root.
pub const ROOT_SCHEMA_FILES: &[&str] = &["public/metadata/schema.json", "schema.json"];

/// Scans individual directories into project records.
#[derive(Clone)]
pub struct ProjectScanner {
    fs: Arc<dyn WorkspaceFs>,
    marker_file: String,
    service_file: String,
    filters: Arc<Vec<PathFilter>>,
}

impl ProjectScanner {
    pub fn new(fs: Arc<dyn WorkspaceFs>, config: &WorkspaceConfig) -> ScoutResult<Self> {
        let filters = SUBTREES
            .iter()
            .map(|subtree| {
                PathFilter::new(
                    subtree.patterns,
                    std::iter::empty::<&str>(),
                    BUILD_OUTPUT_DIRS,
                )
            })
            .collect::<ScoutResult<Vec<_>>>()?;

        Ok(Self {
            fs,
            marker_file: config.marker_file().to_string(),
            service_file: config.service_file().to_string(),
            filters: Arc::new(filters),
        })
    }

    pub fn marker_file(&self) -> &str {
        &self.marker_file
    }

    pub fn service_file(&self) -> &str {
        &self.service_file
    }

    /// Scan `dir`; `None` when it holds no marker file or the marker cannot be decoded.
    ///
    /// `workspace_roots` only feeds the record's display-relative path.
    pub async fn scan_root(&self, dir: &Path, workspace_roots: &[PathBuf]) -> Option<ProjectRecord> {
        let manifest_path = dir.join(&self.marker_file);
        if !self.fs.exists(&manifest_path).await {
            return None;
        }

        let manifest = match read_manifest(self.fs.as_ref(), &manifest_path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Skipping project at {}: {}", dir.display(), e);
                return None;
            }
        };

        let name = manifest
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| directory_name(dir));

        let mut record = ProjectRecord {
            root_path: dir.to_path_buf(),
            name,
            relative_path: relative_to_workspace(dir, workspace_roots),
            project_type: classify(&manifest),
            builder_keys: manifest.builders.keys().cloned().collect(),
            dependency_keys: manifest.dependencies.keys().cloned().collect(),
            manifest,
            service_config: None,
            schemas: Vec::new(),
            file_inventory: Vec::new(),
        };

        let entry = self.entry(manifest_path, FileCategory::Manifest).await;
        record.file_inventory.push(entry);

        self.read_service(&mut record).await;
        self.collect_subtrees(&mut record).await;
        self.collect_root_schemas(&mut record).await;

        info!(
            "Found {} project '{}' at {} ({} context files)",
            record.project_type,
            record.name,
            dir.display(),
            record.file_inventory.len()
        );

        Some(record)
    }

    async fn read_service(&self, record: &mut ProjectRecord) {
        let service_path = record.root_path.join(&self.service_file);
        if !self.fs.exists(&service_path).await {
            return;
        }

        match read_service_config(self.fs.as_ref(), &service_path).await {
            Ok(service) => {
                debug!("Found service descriptor {}", service_path.display());
                record.service_config = Some(service);
                let entry = self.entry(service_path, FileCategory::Service).await;
                record.file_inventory.push(entry);
            }
            Err(ScoutError::NotFound { .. }) => {}
            Err(e) => warn!("Ignoring service descriptor: {}", e),
        }
    }

    async fn collect_subtrees(&self, record: &mut ProjectRecord) {
        for (subtree, filter) in SUBTREES.iter().zip(self.filters.iter()) {
            let dir = record.root_path.join(subtree.dir);
            if !self.fs.is_dir(&dir).await {
                continue;
            }

            let files = match self.fs.find_files(&dir, filter).await {
                Ok(files) => files,
                Err(e) => {
                    warn!("Failed to list {}: {}", dir.display(), e);
                    continue;
                }
            };

            debug!(
                "Found {} {} files under {}",
                files.len(),
                subtree.category,
                dir.display()
            );

            for file in files {
                if subtree.category == FileCategory::Schema {
                    self.add_schema(record, file).await;
                } else {
                    let entry = self.entry(file, subtree.category).await;
                    record.file_inventory.push(entry);
                }
            }
        }
    }

    async fn collect_root_schemas(&self, record: &mut ProjectRecord) {
        for relative in ROOT_SCHEMA_FILES {
            let path = record.root_path.join(relative);
            if self.fs.exists(&path).await {
                self.add_schema(record, path).await;
            }
        }
    }

    async fn add_schema(&self, record: &mut ProjectRecord, path: PathBuf) {
        match read_data_schema(self.fs.as_ref(), &path).await {
            Ok(schema) => {
                let entry = self.entry(path.clone(), FileCategory::Schema).await;
                record.file_inventory.push(entry);
                record.schemas.push(SchemaDocument { path, schema });
            }
            Err(ScoutError::NotFound { .. }) => {}
            Err(e) => warn!("Ignoring schema file: {}", e),
        }
    }

    async fn entry(&self, path: PathBuf, category: FileCategory) -> InventoryEntry {
        let modified_at = self.fs.modified_at(&path).await.ok();
        InventoryEntry {
            path,
            category,
            modified_at,
        }
    }
}

fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| dir.display().to_string())
}

/// Path of `dir` relative to the deepest workspace root containing it.
///
/// `.` for a root itself; the absolute path when no root contains `dir`.
pub fn relative_to_workspace(dir: &Path, workspace_roots: &[PathBuf]) -> String {
    let owner = workspace_roots
        .iter()
        .filter(|root| dir.starts_with(root))
        .max_by_key(|root| root.as_os_str().len());

    let Some(root) = owner else {
        return dir.display().to_string();
    };

    match dir.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => dir.display().to_string(),
    }
}
