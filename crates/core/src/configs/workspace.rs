use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{ScoutError, ScoutResult};

/// Location of the optional config file, relative to a workspace root.
pub const CONFIG_RELATIVE_PATH: &str = ".scout/config.yml";

pub const DEFAULT_MARKER_FILE: &str = "manifest.json";
pub const DEFAULT_SERVICE_FILE: &str = "service.json";
pub const DEFAULT_MAX_CONCURRENT_SCANS: usize = 8;
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 5_000;

#[derive(Deserialize, Serialize, JsonSchema, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// File name whose presence marks a directory as a project root.
    pub marker_file: Option<String>,
    /// File name of the backend service descriptor next to the marker file.
    pub service_file: Option<String>,
    /// Glob patterns for paths to exclude from nested project discovery, in addition to the built-in excludes.
    pub excludes: Option<Vec<String>>,
    /// Upper bound on project roots scanned at the same time during a full scan.
    pub max_concurrent_scans: Option<usize>,
    /// Timeout for a single file-system call, in milliseconds.
    pub io_timeout_ms: Option<u64>,
}

impl WorkspaceConfig {
    pub fn marker_file(&self) -> &str {
        self.marker_file.as_deref().unwrap_or(DEFAULT_MARKER_FILE)
    }

    pub fn service_file(&self) -> &str {
        self.service_file.as_deref().unwrap_or(DEFAULT_SERVICE_FILE)
    }

    pub fn excludes(&self) -> &[String] {
        self.excludes.as_deref().unwrap_or_default()
    }

    pub fn max_concurrent_scans(&self) -> usize {
        self.max_concurrent_scans
            .unwrap_or(DEFAULT_MAX_CONCURRENT_SCANS)
            .max(1)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms.unwrap_or(DEFAULT_IO_TIMEOUT_MS))
    }
}

pub fn parse_workspace_config(yaml_str: &str) -> ScoutResult<WorkspaceConfig> {
    let config: WorkspaceConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

pub fn load_workspace_config(path: &Path) -> ScoutResult<WorkspaceConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ScoutError::Config(format!(
            "Failed to read workspace config {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_workspace_config(&content).map_err(|e| {
        ScoutError::Config(format!(
            "Failed to parse workspace config {}: {}",
            path.display(),
            e
        ))
    })
}

/// Find the config for a set of workspace roots.
///
/// The first root holding `.scout/config.yml` wins. Without one, defaults apply.
pub fn discover_workspace_config(roots: &[PathBuf]) -> ScoutResult<WorkspaceConfig> {
    for root in roots {
        let candidate = root.join(CONFIG_RELATIVE_PATH);
        if candidate.is_file() {
            return load_workspace_config(&candidate);
        }
    }
    Ok(WorkspaceConfig::default())
}

/// JSON schema of the config file, for editor integration.
pub fn workspace_config_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(WorkspaceConfig)).unwrap_or_default()
}
