//! Filesystem component writer

use crate::manifest::{self, CONFIG_FILE, PACKAGE_JSON};
use crate::{ComponentWriter, Workspace};
use capsule_errors::{Error, MaterializationError};
use capsule_events::{EventEmitter, EventSender};
use capsule_scope::LocalScope;
use capsule_types::{ComponentWithDependencies, ResolvedComponent, WriteDirectives};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Directory under the destination holding dependency components
pub const DEPENDENCIES_DIR: &str = ".dependencies";

/// Directory under a component holding its build output
pub const DIST_DIR: &str = "dist";

/// Namespace under `node_modules` used for link shims
pub const LINK_NAMESPACE: &str = "@capsule";

/// A file the writer is about to produce
#[derive(Debug)]
struct PlannedFile {
    target: PathBuf,
    contents: String,
}

/// Writer laying components out on the local filesystem
///
/// The primary component goes to the destination root, each dependency to
/// `<dest>/.dependencies/<scope>/<name>/<version>`.
#[derive(Debug, Clone, Default)]
pub struct FsWriter {
    event_sender: Option<EventSender>,
}

impl FsWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Directory a dependency is written to under `root`
    #[must_use]
    pub fn dependency_dir(root: &Path, component: &ResolvedComponent) -> PathBuf {
        let [scope, name, version] = component.id.path_segments();
        root.join(DEPENDENCIES_DIR)
            .join(scope)
            .join(name)
            .join(version)
    }

    fn plan_component(
        component: &ResolvedComponent,
        dir: &Path,
        graph_dirs: &[(&ResolvedComponent, PathBuf)],
        directives: &WriteDirectives,
    ) -> Result<Vec<PlannedFile>, Error> {
        let mut planned = Vec::new();

        for file in &component.files {
            ensure_relative(component, &file.path)?;
            planned.push(PlannedFile {
                target: dir.join(&file.path),
                contents: file.contents.clone(),
            });
        }

        if directives.dist {
            for file in &component.dists {
                ensure_relative(component, &file.path)?;
                planned.push(PlannedFile {
                    target: dir.join(DIST_DIR).join(&file.path),
                    contents: file.contents.clone(),
                });
            }
        }

        if directives.with_package_json {
            planned.push(PlannedFile {
                target: dir.join(PACKAGE_JSON),
                contents: manifest::package_json(component)?,
            });
        }

        if directives.with_config {
            planned.push(PlannedFile {
                target: dir.join(CONFIG_FILE),
                contents: manifest::config_json(component, &directives.compiler)?,
            });
        }

        if directives.create_link_files {
            for dependency in &component.dependencies {
                let Some((target, target_dir)) = graph_dirs
                    .iter()
                    .find(|(candidate, _)| dependency.matches(&candidate.id))
                else {
                    tracing::warn!(
                        component = %component.id,
                        dependency = %dependency,
                        "dependency missing from graph, no link written"
                    );
                    continue;
                };
                planned.push(PlannedFile {
                    target: dir
                        .join("node_modules")
                        .join(LINK_NAMESPACE)
                        .join(target.id.package_name())
                        .join("index.js"),
                    contents: manifest::link_shim(target_dir)?,
                });
            }
        }

        Ok(planned)
    }

    async fn write_planned(file: &PlannedFile) -> Result<(), Error> {
        if let Some(parent) = file.target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| MaterializationError::from_io(&e, parent.display().to_string()))?;
        }
        fs::write(&file.target, &file.contents)
            .await
            .map_err(|e| MaterializationError::from_io(&e, file.target.display().to_string()))?;
        Ok(())
    }

    async fn write_graph(
        &self,
        mut graph: ComponentWithDependencies,
        directives: &WriteDirectives,
    ) -> Result<ComponentWithDependencies, Error> {
        let root = directives.write_to_path.clone();

        let dirs: Vec<PathBuf> = graph
            .iter()
            .enumerate()
            .map(|(index, component)| {
                if index == 0 {
                    root.clone()
                } else {
                    Self::dependency_dir(&root, component)
                }
            })
            .collect();
        let graph_dirs: Vec<(&ResolvedComponent, PathBuf)> =
            graph.iter().zip(dirs.iter().cloned()).collect();

        let mut planned = Vec::new();
        for (component, dir) in &graph_dirs {
            planned.extend(Self::plan_component(component, dir, &graph_dirs, directives)?);
        }
        drop(graph_dirs);

        if !directives.force {
            for file in &planned {
                let exists = fs::try_exists(&file.target).await.map_err(|e| {
                    MaterializationError::from_io(&e, file.target.display().to_string())
                })?;
                if exists {
                    return Err(MaterializationError::Conflict {
                        path: file.target.display().to_string(),
                    }
                    .into());
                }
            }
        }

        // a component listing the same path twice keeps the last contents
        let mut deduped: HashMap<&Path, &PlannedFile> = HashMap::new();
        for file in &planned {
            deduped.insert(file.target.as_path(), file);
        }
        for file in deduped.values() {
            Self::write_planned(file).await?;
        }

        for dir in &dirs {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| MaterializationError::from_io(&e, dir.display().to_string()))?;
        }

        if directives.write_internal_dependencies {
            let scope = LocalScope::new(&root);
            for component in graph.iter() {
                scope
                    .put(component)
                    .await
                    .map_err(Error::into_materialization)?;
            }
        }

        for (component, dir) in graph.iter_mut().zip(dirs) {
            self.emit_debug(format!(
                "wrote {} to {}",
                component.id,
                dir.display()
            ));
            component.written_path = Some(dir);
        }

        Ok(graph)
    }
}

fn ensure_relative(component: &ResolvedComponent, path: &Path) -> Result<(), Error> {
    let escapes = path.as_os_str().is_empty()
        || path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(MaterializationError::InvalidPath {
            component: component.id.to_string(),
            path: path.display().to_string(),
        }
        .into());
    }
    Ok(())
}

impl EventEmitter for FsWriter {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

#[async_trait::async_trait]
impl ComponentWriter for FsWriter {
    async fn write(
        &self,
        workspace: &Workspace,
        components: Vec<ComponentWithDependencies>,
        directives: &WriteDirectives,
    ) -> Result<Vec<ComponentWithDependencies>, Error> {
        tracing::debug!(
            workspace = %workspace.root().display(),
            destination = %directives.write_to_path.display(),
            graphs = components.len(),
            "writing components"
        );

        let mut written = Vec::with_capacity(components.len());
        for graph in components {
            written.push(self.write_graph(graph, directives).await?);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_relative() {
        let component = ResolvedComponent::new("org/button@1.0.0".parse().unwrap());
        assert!(ensure_relative(&component, Path::new("src/index.js")).is_ok());
        assert!(ensure_relative(&component, Path::new("./index.js")).is_ok());
        assert!(ensure_relative(&component, Path::new("../escape.js")).is_err());
        assert!(ensure_relative(&component, Path::new("/etc/passwd")).is_err());
        assert!(ensure_relative(&component, Path::new("")).is_err());
    }

    #[test]
    fn test_dependency_dir() {
        let component = ResolvedComponent::new("org.widgets/icon@1.0.0".parse().unwrap());
        assert_eq!(
            FsWriter::dependency_dir(Path::new("/sandbox"), &component),
            PathBuf::from("/sandbox/.dependencies/org.widgets/icon/1.0.0")
        );
    }
}
