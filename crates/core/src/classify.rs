//! Project classification from manifest builders.

use scout_model::{Manifest, ProjectType};

/// Builder keys checked in order; the first one a manifest declares decides its type.
const BUILDER_PRECEDENCE: &[(&str, ProjectType)] = &[
    ("store", ProjectType::StoreTheme),
    ("react", ProjectType::ReactApp),
    ("node", ProjectType::NodeService),
    ("graphql", ProjectType::GraphqlService),
    ("pixel", ProjectType::PixelApp),
];

/// Derive a project's type from the builders its manifest declares.
///
/// A manifest with no recognised builder (or none at all) is a generic
/// [`ProjectType::App`]. [`ProjectType::Unknown`] is never returned.
pub fn classify(manifest: &Manifest) -> ProjectType {
    BUILDER_PRECEDENCE
        .iter()
        .find(|(key, _)| manifest.builders.contains_key(*key))
        .map(|(_, project_type)| *project_type)
        .unwrap_or(ProjectType::App)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(builders: &[&str]) -> Manifest {
        Manifest {
            builders: builders
                .iter()
                .map(|b| (b.to_string(), "0.x".to_string()))
                .collect(),
            ..Manifest::default()
        }
    }

    #[test]
    fn store_wins_over_react() {
        assert_eq!(
            classify(&manifest_with(&["react", "store"])),
            ProjectType::StoreTheme
        );
    }

    #[test]
    fn empty_builders_is_generic_app() {
        assert_eq!(classify(&manifest_with(&[])), ProjectType::App);
    }

    #[test]
    fn node_only_is_node_service() {
        assert_eq!(classify(&manifest_with(&["node"])), ProjectType::NodeService);
    }

    #[test]
    fn precedence_chain() {
        assert_eq!(
            classify(&manifest_with(&["pixel", "graphql", "node", "react"])),
            ProjectType::ReactApp
        );
        assert_eq!(
            classify(&manifest_with(&["pixel", "graphql", "node"])),
            ProjectType::NodeService
        );
        assert_eq!(
            classify(&manifest_with(&["pixel", "graphql"])),
            ProjectType::GraphqlService
        );
        assert_eq!(classify(&manifest_with(&["pixel"])), ProjectType::PixelApp);
        assert_eq!(
            classify(&manifest_with(&["messages", "docs"])),
            ProjectType::App
        );
    }
}
