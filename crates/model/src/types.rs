//! Core types of the discovery model.
//!
//! - [`ProjectType`] - Classification derived from a manifest's builders
//! - [`FileCategory`] - Closed set of categories for inventoried files
//! - [`InventoryEntry`] - One categorized file of a project
//! - [`ProjectRecord`] - Everything known about one discovered project root

use crate::manifest::{DataSchema, Manifest, ServiceConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

/// The kind of project a root holds.
///
/// Derived from the manifest's builder keys, never set directly. `Unknown`
/// stands for "not a project at all" and is never the type of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    App,
    StoreTheme,
    ReactApp,
    NodeService,
    GraphqlService,
    PixelApp,
    Unknown,
}

impl ProjectType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::StoreTheme => "store-theme",
            Self::ReactApp => "react-app",
            Self::NodeService => "node-service",
            Self::GraphqlService => "graphql-service",
            Self::PixelApp => "pixel-app",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a file in a project's inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileCategory {
    /// The marker file itself.
    Manifest,
    /// The backend service descriptor.
    Service,
    /// A declarative data-schema document.
    Schema,
    /// A front-end component under the UI sub-tree.
    UiComponent,
    /// An API schema definition (GraphQL).
    ApiSchema,
    /// Backend service source code.
    ServiceFile,
}

impl FileCategory {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Service => "service",
            Self::Schema => "schema",
            Self::UiComponent => "ui-component",
            Self::ApiSchema => "api-schema",
            Self::ServiceFile => "service-file",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One categorized file of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub path: PathBuf,
    pub category: FileCategory,
    /// `None` when the timestamp could not be read.
    pub modified_at: Option<SystemTime>,
}

/// A decoded data-schema document together with where it was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub path: PathBuf,
    pub schema: DataSchema,
}

/// Everything known about one discovered project.
///
/// A record only exists for a directory where the marker file was found and
/// decoded, so `manifest` is always populated. `root_path` is the identity key
/// inside the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Absolute path of the directory holding the marker file.
    pub root_path: PathBuf,

    /// Display name: the manifest `name`, or the directory name when absent.
    pub name: String,

    /// Root path relative to the workspace root that contains it.
    pub relative_path: String,

    pub manifest: Manifest,

    /// Present iff a service descriptor was found and decoded.
    #[serde(default)]
    pub service_config: Option<ServiceConfig>,

    #[serde(default)]
    pub schemas: Vec<SchemaDocument>,

    pub project_type: ProjectType,

    pub builder_keys: BTreeSet<String>,

    pub dependency_keys: BTreeSet<String>,

    #[serde(default)]
    pub file_inventory: Vec<InventoryEntry>,
}

impl ProjectRecord {
    /// Number of inventoried files in the given category.
    #[must_use]
    pub fn count_of(&self, category: FileCategory) -> usize {
        self.file_inventory
            .iter()
            .filter(|entry| entry.category == category)
            .count()
    }

    /// Always true: records are only ever created for real project roots.
    #[must_use]
    pub const fn is_project(&self) -> bool {
        true
    }
}
