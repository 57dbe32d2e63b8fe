//! Context aggregation
//!
//! Pure text composition from [`ProjectRecord`]s: a project overview, a block
//! tailored to the category of a target file, the platform dependencies a
//! project declares, and a summary of sibling projects. Every line is a `//`
//! comment so the output can be dropped in front of source code as-is.
//!
//! Values copied from manifests are sanitised: the only control character
//! that ever appears in the output is `\n` between lines.

use std::collections::BTreeMap;
use std::path::Path;

use scout_model::{FileCategory, OpaqueValue, ProjectRecord};

/// Dependencies with this prefix are platform apps worth surfacing.
pub const PLATFORM_DEPENDENCY_PREFIX: &str = "vtex.";

const OVERVIEW_DEPENDENCY_LIMIT: usize = 5;
const COMPONENT_APP_LIMIT: usize = 3;
const DEPENDENCY_BLOCK_LIMIT: usize = 5;

/// How a target file relates to its project, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// The marker file itself (exact name match).
    Manifest,
    /// A data-schema document (exact name or schema directory).
    DataSchema,
    /// Front-end component: `react` directory and script extension.
    UiComponent,
    /// Backend source: `node` directory and script extension.
    ServiceFile,
    /// GraphQL: `graphql` directory or GraphQL extension.
    ApiSchema,
}

/// Categories of `file` within `project`, ordered from most to least specific.
pub fn classify_file(project: &ProjectRecord, file: &Path) -> Vec<FileKind> {
    let relative = file.strip_prefix(&project.root_path).unwrap_or(file);
    let file_name = relative.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let extension = relative.extension().and_then(|e| e.to_str()).unwrap_or("");
    let dirs: Vec<&str> = relative
        .parent()
        .map(|p| p.iter().filter_map(|c| c.to_str()).collect())
        .unwrap_or_default();
    let in_dir = |name: &str| dirs.iter().any(|d| *d == name);

    let mut kinds = Vec::new();
    if file_name == marker_file_name(project) {
        kinds.push(FileKind::Manifest);
    }
    if file_name == "schema.json" || (extension == "json" && dirs.ends_with(&["public", "metadata", "schemas"])) {
        kinds.push(FileKind::DataSchema);
    }
    if in_dir("react") && matches!(extension, "tsx" | "ts" | "jsx" | "js") {
        kinds.push(FileKind::UiComponent);
    }
    if in_dir("node") && matches!(extension, "ts" | "js") {
        kinds.push(FileKind::ServiceFile);
    }
    if in_dir("graphql") || matches!(extension, "gql" | "graphql") {
        kinds.push(FileKind::ApiSchema);
    }
    kinds
}

fn marker_file_name(project: &ProjectRecord) -> &str {
    project
        .file_inventory
        .iter()
        .find(|entry| entry.category == FileCategory::Manifest)
        .and_then(|entry| entry.path.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("manifest.json")
}

/// Identity, type, location, builders and headline dependencies of a project.
pub fn build_overview(project: &ProjectRecord) -> String {
    let manifest = &project.manifest;
    let mut lines = vec![
        "// VTEX Project Context".to_string(),
        format!(
            "// Project: {} v{}",
            clean(&manifest.qualified_name().unwrap_or_else(|| project.name.clone())),
            clean(manifest.version.as_deref().unwrap_or("unknown"))
        ),
        format!("// Type: {}", project.project_type),
    ];
    if let Some(title) = manifest.title.as_deref() {
        lines.push(format!("// Title: {}", clean(title)));
    }
    if let Some(description) = manifest.description.as_deref() {
        lines.push(format!("// Description: {}", clean(description)));
    }
    lines.push(format!("// Location: {}", clean(&project.relative_path)));

    if !project.builder_keys.is_empty() {
        lines.push(format!("// Builders: {}", builder_list(project)));
    }
    if !project.dependency_keys.is_empty() {
        let deps = project
            .dependency_keys
            .iter()
            .take(OVERVIEW_DEPENDENCY_LIMIT)
            .map(|d| clean(d))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("// Main Dependencies: {}", deps));
    }

    lines.join("\n")
}

/// Guidance for `file`, one template per matching category, most specific first.
///
/// Empty when the file matches no known category.
pub fn build_file_context(project: &ProjectRecord, file: &Path) -> String {
    classify_file(project, file)
        .into_iter()
        .map(|kind| match kind {
            FileKind::Manifest => manifest_context(project),
            FileKind::DataSchema => data_schema_context(project, file),
            FileKind::UiComponent => ui_component_context(project),
            FileKind::ServiceFile => service_file_context(project),
            FileKind::ApiSchema => api_schema_context(project),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Platform apps the project depends on, with their version ranges.
///
/// Empty when the project declares none.
pub fn build_dependencies_block(project: &ProjectRecord) -> String {
    let deps: Vec<_> = project
        .manifest
        .dependencies
        .iter()
        .filter(|(name, _)| name.starts_with(PLATFORM_DEPENDENCY_PREFIX))
        .take(DEPENDENCY_BLOCK_LIMIT)
        .collect();

    if deps.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "// VTEX Dependencies Context".to_string(),
        "// Available VTEX apps in this project:".to_string(),
    ];
    for (name, version) in deps {
        lines.push(format!("// - {} ({})", clean(name), clean(version)));
    }
    lines.join("\n")
}

/// Names and types of the other registered projects.
///
/// Empty when `project` is the only one.
pub fn build_cross_project_block(project: &ProjectRecord, all_projects: &[ProjectRecord]) -> String {
    let siblings: Vec<_> = all_projects
        .iter()
        .filter(|p| p.root_path != project.root_path)
        .collect();

    if siblings.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "// Multi-Project Workspace Context".to_string(),
        format!(
            "// Current project: {} ({})",
            clean(&project.name),
            project.project_type
        ),
        format!(
            "// Other VTEX projects in workspace: {}",
            siblings
                .iter()
                .map(|p| format!("{} ({})", clean(&p.name), p.project_type))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    ];

    // Siblings this project declares as dependencies, matched by `vendor.name`.
    let linked: Vec<_> = siblings
        .iter()
        .filter_map(|p| p.manifest.qualified_name())
        .filter(|qualified| project.dependency_keys.contains(qualified))
        .map(|qualified| clean(&qualified))
        .collect();
    if !linked.is_empty() {
        lines.push(format!("// Depends on workspace projects: {}", linked.join(", ")));
    }

    lines.push("// Consider dependencies and interactions between projects".to_string());
    lines.join("\n")
}

/// Everything known about `file`: overview, file context, dependencies and siblings.
pub fn build_context_for_file(
    project: &ProjectRecord,
    file: &Path,
    all_projects: &[ProjectRecord],
) -> String {
    [
        build_overview(project),
        build_file_context(project, file),
        build_dependencies_block(project),
        build_cross_project_block(project, all_projects),
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("\n\n")
}

/// Short description of the whole workspace.
pub fn build_workspace_summary(all_projects: &[ProjectRecord]) -> String {
    match all_projects {
        [] => "No VTEX projects detected".to_string(),
        [project] => [
            format!(
                "Project: {}",
                clean(&project.manifest.qualified_name().unwrap_or_else(|| project.name.clone()))
            ),
            format!("Type: {}", project.project_type),
            format!("Builders: {}", builder_list(project)),
            format!("Context Files: {}", project.file_inventory.len()),
            format!("Dependencies: {}", project.dependency_keys.len()),
        ]
        .join("\n"),
        projects => {
            let mut lines = vec![format!(
                "Multi-Project Workspace ({} projects)",
                projects.len()
            )];
            lines.extend(projects.iter().map(|p| {
                format!(
                    "- {} ({}) - {}",
                    clean(&p.name),
                    p.project_type,
                    clean(&p.relative_path)
                )
            }));
            lines.join("\n")
        }
    }
}

fn manifest_context(project: &ProjectRecord) -> String {
    [
        "// VTEX Manifest Context".to_string(),
        "// This is the VTEX app manifest configuration".to_string(),
        "// Required fields: vendor, name, version, title, description, builders".to_string(),
        "// Use semantic versioning for version field".to_string(),
        "// Builders define the app type: react, node, store, graphql, etc.".to_string(),
        format!("// Current project: {}", clean(&project.name)),
        format!("// Declared builders: {}", builder_list(project)),
    ]
    .join("\n")
}

fn data_schema_context(project: &ProjectRecord, file: &Path) -> String {
    let mut lines = vec![
        "// VTEX Data Schema Context".to_string(),
        "// This is a JSON schema describing block or entity properties".to_string(),
        "// Keep property names stable: stored content is keyed by them".to_string(),
    ];

    if let Some(document) = project.schemas.iter().find(|s| s.path == file) {
        let schema = &document.schema;
        if let Some(schema_type) = schema.schema_type.as_deref() {
            lines.push(format!("// Schema type: {}", clean(schema_type)));
        }
        if !schema.properties.is_empty() {
            let names = schema
                .properties
                .keys()
                .map(|k| clean(k))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("// Properties: {}", names));
        }
        if !schema.required.is_empty() {
            let required = schema
                .required
                .iter()
                .map(|r| clean(r))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("// Required: {}", required));
        }
    }

    lines.push(format!(
        "// Schema files in project: {}",
        project.count_of(FileCategory::Schema)
    ));
    lines.join("\n")
}

fn ui_component_context(project: &ProjectRecord) -> String {
    let mut lines = vec![
        "// VTEX React Component Context".to_string(),
        "// This is a VTEX IO React component".to_string(),
        format!("// Declared builders: {}", builder_list(project)),
        "// Available VTEX hooks: useProduct, useOrderForm, useSession, usePixel".to_string(),
        "// Use CSS Handles for styling: useCssHandles".to_string(),
        "// VTEX components should export default and be wrapped with React.memo when appropriate"
            .to_string(),
    ];

    let apps = platform_dependencies(project, COMPONENT_APP_LIMIT);
    if !apps.is_empty() {
        lines.push(format!("// Available VTEX apps: {}", apps.join(", ")));
    }
    lines.join("\n")
}

fn service_file_context(project: &ProjectRecord) -> String {
    let mut lines = vec![
        "// VTEX Node Service Context".to_string(),
        "// This is a VTEX IO Node.js service".to_string(),
        "// Available clients: IOClients (masterdata, checkout, catalog, etc.)".to_string(),
        "// Use ctx for request context and state".to_string(),
        "// Implement proper error handling and logging".to_string(),
    ];

    if let Some(service) = &project.service_config {
        let mut limits = Vec::new();
        if let Some(memory) = service.memory {
            limits.push(format!("memory={}MB", memory));
        }
        if let Some(timeout) = service.timeout {
            limits.push(format!("timeout={}s", timeout));
        }
        if let Some(ttl) = service.ttl {
            limits.push(format!("ttl={}min", ttl));
        }
        match (service.min_replicas, service.max_replicas) {
            (Some(min), Some(max)) => limits.push(format!("replicas={}-{}", min, max)),
            (Some(min), None) => limits.push(format!("minReplicas={}", min)),
            (None, Some(max)) => limits.push(format!("maxReplicas={}", max)),
            (None, None) => {}
        }
        if let Some(workers) = service.workers {
            limits.push(format!("workers={}", workers));
        }
        if !limits.is_empty() {
            lines.push(format!("// Service config: {}", limits.join(", ")));
        }
        if !service.routes.is_empty() {
            lines.push(format!("// Routes: {}", describe_entries(&service.routes, "path")));
        }
        if !service.events.is_empty() {
            lines.push(format!("// Events: {}", describe_entries(&service.events, "sender")));
        }
    }
    lines.join("\n")
}

fn api_schema_context(project: &ProjectRecord) -> String {
    [
        "// VTEX GraphQL Context".to_string(),
        "// This is a VTEX IO GraphQL schema/resolver".to_string(),
        "// Use @cacheControl for query optimization".to_string(),
        "// Available directives: @cacheControl, @deprecated".to_string(),
        "// Implement proper type definitions and resolvers".to_string(),
        format!(
            "// GraphQL files in project: {}",
            project.count_of(FileCategory::ApiSchema)
        ),
    ]
    .join("\n")
}

/// `name (detail)` per entry: the entry's `field` string when it has one, else its shape.
fn describe_entries(entries: &BTreeMap<String, OpaqueValue>, field: &str) -> String {
    entries
        .iter()
        .map(|(name, value)| {
            let detail = match value {
                OpaqueValue::Map(map) => map
                    .get(field)
                    .and_then(OpaqueValue::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.summary()),
                other => other.summary(),
            };
            format!("{} ({})", clean(name), clean(&detail))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn builder_list(project: &ProjectRecord) -> String {
    if project.builder_keys.is_empty() {
        return "none".to_string();
    }
    project
        .builder_keys
        .iter()
        .map(|b| clean(b))
        .collect::<Vec<_>>()
        .join(", ")
}

fn platform_dependencies(project: &ProjectRecord, limit: usize) -> Vec<String> {
    project
        .dependency_keys
        .iter()
        .filter(|d| d.starts_with(PLATFORM_DEPENDENCY_PREFIX))
        .take(limit)
        .map(|d| clean(d))
        .collect()
}

/// Replace control characters (newlines included) so a value stays on one line.
fn clean(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}
