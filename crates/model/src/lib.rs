//! Scout data model.
//!
//! Serializable types shared by the discovery engine and its hosts:
//!
//! - [`manifest`] - Typed manifest, service descriptor and data-schema documents
//! - [`types`] - Project records, classifications and file inventory entries
//! - [`message`] - File-change events a host feeds into the registry
//! - [`value`] - Opaque pass-through values for untyped configuration fields

pub mod manifest;
pub mod message;
pub mod types;
pub mod value;

pub use manifest::{DataSchema, Manifest, Policy, ServiceConfig};
pub use message::{WatchEvent, WatchEventKind};
pub use types::{FileCategory, InventoryEntry, ProjectRecord, ProjectType, SchemaDocument};
pub use value::OpaqueValue;
