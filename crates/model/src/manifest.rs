//! Declarative configuration files read from a project root.
//!
//! - [`Manifest`] - the marker file (`manifest.json`) that identifies a project root
//! - [`ServiceConfig`] - the optional backend service descriptor (`service.json`)
//! - [`DataSchema`] - declarative data-schema documents (`schema.json` and friends)
//!
//! All of these are decoded leniently: missing fields (and `null` collections)
//! fall back to defaults and unknown fields are ignored. Only content that is not valid JSON, or a known
//! field with the wrong shape, is a decode error.

use crate::value::OpaqueValue;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Decode an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The parsed marker file of a project.
///
/// `builders` decides the project's classification; `dependencies` lists the
/// platform apps this project declares it needs (e.g. `vtex.styleguide`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub builders: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub billing_options: Option<OpaqueValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub registries: Vec<String>,
    #[serde(default)]
    pub credential_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
}

impl Manifest {
    /// `vendor.name`, or whichever half is present.
    #[must_use]
    pub fn qualified_name(&self) -> Option<String> {
        match (self.vendor.as_deref(), self.name.as_deref()) {
            (Some(vendor), Some(name)) => Some(format!("{}.{}", vendor, name)),
            (None, Some(name)) => Some(name.to_string()),
            (Some(vendor), None) => Some(vendor.to_string()),
            (None, None) => None,
        }
    }
}

/// A permission the app requests from the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attrs: BTreeMap<String, OpaqueValue>,
}

/// Resource limits and routing of a backend service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub memory: Option<u64>,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub min_replicas: Option<u64>,
    #[serde(default)]
    pub max_replicas: Option<u64>,
    #[serde(default)]
    pub workers: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub routes: BTreeMap<String, OpaqueValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: BTreeMap<String, OpaqueValue>,
}

/// A declarative data-schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSchema {
    #[serde(default, rename = "type")]
    pub schema_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: BTreeMap<String, OpaqueValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: Vec<String>,
    #[serde(default)]
    pub additional_properties: Option<OpaqueValue>,
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
}
