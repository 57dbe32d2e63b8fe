//! Marker-file reader
//!
//! Reads the manifest, service descriptor and data-schema documents of a
//! project root and decodes them into typed records. Absence is reported as
//! [`ScoutError::NotFound`], malformed content as [`ScoutError::Parse`]; it is
//! up to the caller to log and continue.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::fs::WorkspaceFs;
use crate::types::{ScoutError, ScoutResult};
use scout_model::{DataSchema, Manifest, ServiceConfig};

pub async fn read_manifest(fs: &dyn WorkspaceFs, path: &Path) -> ScoutResult<Manifest> {
    read_json(fs, path).await
}

pub async fn read_service_config(fs: &dyn WorkspaceFs, path: &Path) -> ScoutResult<ServiceConfig> {
    read_json(fs, path).await
}

pub async fn read_data_schema(fs: &dyn WorkspaceFs, path: &Path) -> ScoutResult<DataSchema> {
    read_json(fs, path).await
}

async fn read_json<T: DeserializeOwned>(fs: &dyn WorkspaceFs, path: &Path) -> ScoutResult<T> {
    let content = fs
        .read_to_string(path)
        .await
        .map_err(|e| ScoutError::from_io(path, e))?;

    parse_json(path, &content)
}

/// Decode `content` read from `path`.
///
/// A leading UTF-8 byte-order mark is tolerated, editors on some platforms write one.
pub fn parse_json<T: DeserializeOwned>(path: &Path, content: &str) -> ScoutResult<T> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    serde_json::from_str(content).map_err(|e| ScoutError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
