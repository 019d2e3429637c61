//! Resolved component graphs

use crate::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Third-party package dependencies: package name to version range
pub type PackageDependencies = BTreeMap<String, String>;

/// A single file belonging to a component, addressed relative to the
/// component's root directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFile {
    pub path: PathBuf,
    pub contents: String,
}

impl ComponentFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Build/tool configuration carried by a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tester: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, String>,
}

/// A component's metadata, its file set and its declared dependencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedComponent {
    pub id: ComponentId,
    #[serde(default)]
    pub files: Vec<ComponentFile>,
    /// Build output artifacts, only materialized on request
    #[serde(default)]
    pub dists: Vec<ComponentFile>,
    #[serde(default)]
    pub config: Option<ToolConfig>,
    #[serde(default)]
    pub package_dependencies: PackageDependencies,
    /// Direct dependencies on other components of the repository
    #[serde(default)]
    pub dependencies: Vec<ComponentId>,
    /// Directory the writer placed this component in
    #[serde(skip)]
    pub written_path: Option<PathBuf>,
}

impl ResolvedComponent {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            files: Vec::new(),
            dists: Vec::new(),
            config: None,
            package_dependencies: PackageDependencies::new(),
            dependencies: Vec::new(),
            written_path: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.files.push(ComponentFile::new(path, contents));
        self
    }

    #[must_use]
    pub fn with_dist(mut self, path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        self.dists.push(ComponentFile::new(path, contents));
        self
    }

    #[must_use]
    pub fn with_package_dependency(
        mut self,
        name: impl Into<String>,
        range: impl Into<String>,
    ) -> Self {
        self.package_dependencies.insert(name.into(), range.into());
        self
    }

    #[must_use]
    pub fn with_dependency(mut self, id: ComponentId) -> Self {
        self.dependencies.push(id);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ToolConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Whether any third-party packages must be installed for this component
    #[must_use]
    pub fn has_package_dependencies(&self) -> bool {
        !self.package_dependencies.is_empty()
    }

    #[must_use]
    pub fn written_path(&self) -> Option<&Path> {
        self.written_path.as_deref()
    }
}

/// A primary component together with its transitive dependencies
///
/// Dependency order is whatever the repository produced; it carries no
/// build-order meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentWithDependencies {
    pub component: ResolvedComponent,
    #[serde(default)]
    pub dependencies: Vec<ResolvedComponent>,
}

impl ComponentWithDependencies {
    pub fn new(component: ResolvedComponent, dependencies: Vec<ResolvedComponent>) -> Self {
        Self {
            component,
            dependencies,
        }
    }

    /// Id of the primary component
    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.component.id
    }

    /// Primary first, then dependencies in their stored order
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedComponent> {
        std::iter::once(&self.component).chain(self.dependencies.iter())
    }

    /// Mutable counterpart of [`Self::iter`]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ResolvedComponent> {
        std::iter::once(&mut self.component).chain(self.dependencies.iter_mut())
    }

    /// Flatten into one ordered sequence, primary first
    #[must_use]
    pub fn flatten(&self) -> Vec<ResolvedComponent> {
        self.iter().cloned().collect()
    }

    /// Total number of components, primary included
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.dependencies.len()
    }

    /// Always false; a graph contains at least its primary
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(text: &str) -> ComponentId {
        text.parse().unwrap()
    }

    #[test]
    fn test_flatten_puts_primary_first() {
        let graph = ComponentWithDependencies::new(
            ResolvedComponent::new(id("org/button@1.0.0")),
            vec![
                ResolvedComponent::new(id("org/icon@1.0.0")),
                ResolvedComponent::new(id("org/theme@2.0.0")),
            ],
        );

        let flat: Vec<String> = graph.flatten().iter().map(|c| c.id.to_string()).collect();
        assert_eq!(
            flat,
            vec!["org/button@1.0.0", "org/icon@1.0.0", "org/theme@2.0.0"]
        );
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_written_path_not_serialized() {
        let mut component = ResolvedComponent::new(id("org/button@1.0.0"))
            .with_package_dependency("lodash", "^4.0.0");
        component.written_path = Some(PathBuf::from("/tmp/somewhere"));

        let json = serde_json::to_string(&component).unwrap();
        assert!(!json.contains("/tmp/somewhere"));

        let back: ResolvedComponent = serde_json::from_str(&json).unwrap();
        assert!(back.written_path.is_none());
        assert!(back.has_package_dependencies());
    }
}
