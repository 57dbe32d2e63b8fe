//! Result types for registry operations
//!
//! This module contains the values returned by [`ProjectRegistry`](crate::registry::ProjectRegistry)
//! operations, providing a centralized location for output structures.

use std::path::PathBuf;

use serde::Serialize;

use scout_model::ProjectRecord;

/// Point-in-time copy of the registry contents.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSnapshot {
    pub roots: Vec<PathBuf>,
    /// Sorted by root path.
    pub projects: Vec<ProjectRecord>,
}

impl WorkspaceSnapshot {
    pub fn has_projects(&self) -> bool {
        !self.projects.is_empty()
    }

    pub fn is_multi_project(&self) -> bool {
        self.projects.len() > 1
    }
}

/// What a targeted registry update did to a root path.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryChange {
    /// A record now exists where none did before.
    Added(Box<ProjectRecord>),
    /// An existing record was replaced by a fresh scan.
    Refreshed(Box<ProjectRecord>),
    /// A record was dropped, either explicitly or because a rescan found no project.
    Removed(PathBuf),
    /// Nothing was registered before or after.
    Unchanged(PathBuf),
}

impl RegistryChange {
    pub fn record(&self) -> Option<&ProjectRecord> {
        match self {
            Self::Added(record) | Self::Refreshed(record) => Some(record),
            Self::Removed(_) | Self::Unchanged(_) => None,
        }
    }

    pub fn root_path(&self) -> &std::path::Path {
        match self {
            Self::Added(record) | Self::Refreshed(record) => &record.root_path,
            Self::Removed(path) | Self::Unchanged(path) => path,
        }
    }
}
