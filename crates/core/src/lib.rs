//! Scout Core Library
//!
//! This is the core library for Scout, a project discovery and context engine for
//! workspaces made of `manifest.json` apps. It finds every project under one or more
//! workspace roots, keeps a live registry of them, and composes context text for
//! any file in the workspace.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`workspace_manager`] - High-level interface used by hosts
//! - [`registry`] - Multi-project registry with targeted updates
//! - [`scanner`] - Single-directory project scanning
//! - [`reader`] - Typed parsing of manifest, service and schema files
//! - [`classify`] - Project type from manifest builders
//! - [`context`] - Context text composition
//! - [`events`] - Ordered dispatch of file-change events
//! - [`watcher`] - Native file-system notifications
//! - [`fs`] - Host file-system trait and its local implementation
//! - [`configs`] - Workspace configuration file
//! - [`results`] - Result types for registry operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use scout_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> scout_core::types::ScoutResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_roots: vec![PathBuf::from(".")],
//!     config_path: None,
//! })
//! .await?;
//!
//! println!("{}", manager.summary().await);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod configs;
pub mod context;
pub mod events;
pub mod fs;
pub mod reader;
pub mod registry;
pub mod results;
pub mod scanner;
pub mod types;
pub mod watcher;
pub mod workspace_manager;

// Re-export the main types for easier usage
pub use registry::{EventAction, ProjectRegistry};
pub use types::{ScoutError, ScoutResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
