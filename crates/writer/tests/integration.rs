//! Integration tests for the filesystem writer

#[cfg(test)]
mod tests {
    use capsule_errors::{Error, MaterializationError};
    use capsule_scope::{ComponentRepository, LocalScope};
    use capsule_types::{
        CompilerCapability, CompilerDescriptor, ComponentId, ComponentWithDependencies,
        IsolationOptions, ResolvedComponent,
    };
    use capsule_writer::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn id(text: &str) -> ComponentId {
        text.parse().unwrap()
    }

    fn button_graph() -> ComponentWithDependencies {
        ComponentWithDependencies::new(
            ResolvedComponent::new(id("org.widgets/button@1.2.0"))
                .with_file("index.js", "module.exports = require('./button');")
                .with_file("src/button.js", "module.exports = 'button';")
                .with_dist("index.js", "compiled button")
                .with_package_dependency("lodash", "^4.0.0")
                .with_dependency(id("org.widgets/icon@1.0.0")),
            vec![ResolvedComponent::new(id("org.widgets/icon@1.0.0"))
                .with_file("index.js", "module.exports = 'icon';")],
        )
    }

    async fn write_with(root: &Path, options: &IsolationOptions) -> Result<Vec<ComponentWithDependencies>, Error> {
        let workspace = Workspace::open(root, None).await?;
        let directives = options.directives(root, &CompilerCapability::NoCompiler);
        FsWriter::new()
            .write(&workspace, vec![button_graph()], &directives)
            .await
    }

    #[tokio::test]
    async fn test_default_layout() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let written = write_with(root, &IsolationOptions::default()).await.unwrap();

        let graph = &written[0];
        assert_eq!(graph.component.written_path(), Some(root));
        assert_eq!(
            graph.dependencies[0].written_path(),
            Some(root.join(".dependencies/org.widgets/icon/1.0.0").as_path())
        );

        assert!(root.join("index.js").is_file());
        assert!(root.join("src/button.js").is_file());
        assert!(root.join(PACKAGE_JSON).is_file());
        assert!(root.join(".dependencies/org.widgets/icon/1.0.0/index.js").is_file());

        // optional outputs stay off by default
        assert!(!root.join(DIST_DIR).exists());
        assert!(!root.join(CONFIG_FILE).exists());
        assert!(!root.join("node_modules").exists());
        assert!(!root.join(".capsule/objects").exists());
    }

    #[tokio::test]
    async fn test_conflict_without_override() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_with(root, &IsolationOptions::default()).await.unwrap();

        let err = write_with(root, &IsolationOptions::default()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Materialization(MaterializationError::Conflict { .. })
        ));

        write_with(root, &IsolationOptions::default().with_override(true))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_optional_outputs() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        let options = IsolationOptions {
            no_package_json: true,
            conf: true,
            dist: true,
            create_link_files: true,
            ..IsolationOptions::default()
        };
        let workspace = Workspace::open(root, None).await.unwrap();
        let compiler = CompilerCapability::HasCompiler(CompilerDescriptor::new("babel"));
        let directives = options.directives(root, &compiler);
        FsWriter::new()
            .write(&workspace, vec![button_graph()], &directives)
            .await
            .unwrap();

        assert!(!root.join(PACKAGE_JSON).exists());
        assert_eq!(
            std::fs::read_to_string(root.join("dist/index.js")).unwrap(),
            "compiled button"
        );

        let config: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(root.join(CONFIG_FILE)).unwrap()).unwrap();
        assert_eq!(config["compiler"]["id"], "babel");

        let shim = std::fs::read_to_string(
            root.join("node_modules/@capsule/org.widgets.icon/index.js"),
        )
        .unwrap();
        assert!(shim.contains(".dependencies/org.widgets/icon/1.0.0"));
    }

    #[tokio::test]
    async fn test_internal_dependencies_make_destination_resolvable() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write_with(root, &IsolationOptions::default().with_internal_dependencies(true))
            .await
            .unwrap();

        let resolved = LocalScope::new(root)
            .resolve(&[id("org.widgets/button@1.2.0")])
            .await
            .unwrap();
        let original = button_graph();
        assert_eq!(resolved[0].component.dependencies, original.component.dependencies);
        assert_eq!(resolved[0].dependencies, original.dependencies);
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("sandbox");
        std::fs::create_dir_all(&root).unwrap();
        let workspace = Workspace::open(&root, None).await.unwrap();
        let graph = ComponentWithDependencies::new(
            ResolvedComponent::new(id("org/evil@1.0.0")).with_file("../outside.js", "nope"),
            vec![],
        );
        let directives = IsolationOptions::default().directives(&root, &CompilerCapability::NoCompiler);

        let err = FsWriter::new()
            .write(&workspace, vec![graph], &directives)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Materialization(MaterializationError::InvalidPath { .. })
        ));
        assert!(!temp.path().join("outside.js").exists());
    }
}
