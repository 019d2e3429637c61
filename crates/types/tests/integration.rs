//! Integration tests for types

#[cfg(test)]
mod tests {
    use capsule_types::*;
    use std::path::Path;

    #[test]
    fn test_component_record_format() {
        let record = r#"{
            "id": "org.widgets/button@1.2.0",
            "files": [{"path": "index.js", "contents": "module.exports = 1;"}],
            "package_dependencies": {"lodash": "^4.0.0"},
            "dependencies": ["org.widgets/icon@1.0.0", "org.widgets/theme"]
        }"#;
        let component: ResolvedComponent = serde_json::from_str(record).unwrap();

        assert_eq!(component.id.scope(), Some("org.widgets"));
        assert_eq!(component.id.version(), Some(&Version::new(1, 2, 0)));
        assert_eq!(component.files.len(), 1);
        assert!(component.dists.is_empty());
        assert!(component.config.is_none());
        assert_eq!(component.package_dependencies["lodash"], "^4.0.0");
        assert_eq!(component.dependencies[1], ComponentId::new("theme").unwrap().with_scope("org.widgets").unwrap());
        assert!(component.written_path().is_none());
    }

    #[test]
    fn test_record_with_bad_dependency_is_rejected() {
        let record = r#"{"id": "org/button@1.0.0", "dependencies": ["org//icon"]}"#;
        assert!(serde_json::from_str::<ResolvedComponent>(record).is_err());
    }

    #[test]
    fn test_compiler_capability_reaches_directives() {
        let compiler = CompilerCapability::from_descriptor(Some(CompilerDescriptor::new(
            "org.envs/react",
        )));
        assert!(compiler.has_compiler());

        let directives = IsolationOptions::default().directives(Path::new("/sandbox"), &compiler);
        assert_eq!(
            directives.compiler.descriptor().map(|d| d.id.as_str()),
            Some("org.envs/react")
        );

        let json = serde_json::to_value(&compiler).unwrap();
        assert_eq!(json["kind"], "has_compiler");
        assert_eq!(json["id"], "org.envs/react");
        assert_eq!(
            serde_json::to_value(CompilerCapability::NoCompiler).unwrap()["kind"],
            "no_compiler"
        );
        assert!(CompilerCapability::from_descriptor(None).descriptor().is_none());
    }

    #[test]
    fn test_graph_mutation_reaches_every_component() {
        let mut graph = ComponentWithDependencies::new(
            ResolvedComponent::new("org/button@1.0.0".parse().unwrap()),
            vec![ResolvedComponent::new("org/icon@1.0.0".parse().unwrap())],
        );
        for component in graph.iter_mut() {
            component.written_path = Some(Path::new("/sandbox").join(component.id.name()));
        }
        let written: Vec<_> = graph
            .flatten()
            .into_iter()
            .filter_map(|c| c.written_path)
            .collect();
        assert_eq!(written.len(), 2);
        assert!(!graph.is_empty());
    }
}
