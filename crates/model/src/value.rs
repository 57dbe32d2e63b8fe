//! Opaque structured values.
//!
//! Manifest and service descriptor fields such as `routes`, `events` or schema
//! `properties` have no fixed shape. They are carried as [`OpaqueValue`] so the
//! rest of the engine can pass them through and display them without
//! inspecting their contents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A JSON-like value whose internal shape is never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpaqueValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<OpaqueValue>),
    Map(BTreeMap<String, OpaqueValue>),
}

impl OpaqueValue {
    /// Short human-readable description of the value's shape, used in context text.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
            Self::Array(items) => format!("[{} items]", items.len()),
            Self::Map(map) => format!("{{{} keys}}", map.len()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}
