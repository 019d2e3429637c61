//! Integration tests for component repositories

#[cfg(test)]
mod tests {
    use capsule_errors::{Error, ResolutionError};
    use capsule_scope::*;
    use capsule_types::{ComponentId, ResolvedComponent};
    use tempfile::tempdir;

    fn id(text: &str) -> ComponentId {
        text.parse().unwrap()
    }

    /// button -> icon, theme; icon -> theme; theme -> button (cycle)
    fn widget_components() -> Vec<ResolvedComponent> {
        vec![
            ResolvedComponent::new(id("org.widgets/button@1.2.0"))
                .with_file("index.js", "module.exports = 'button';")
                .with_package_dependency("lodash", "^4.0.0")
                .with_dependency(id("org.widgets/icon@1.0.0"))
                .with_dependency(id("org.widgets/theme")),
            ResolvedComponent::new(id("org.widgets/icon@1.0.0"))
                .with_file("index.js", "module.exports = 'icon';")
                .with_dependency(id("org.widgets/theme@2.0.0")),
            ResolvedComponent::new(id("org.widgets/theme@1.0.0")),
            ResolvedComponent::new(id("org.widgets/theme@2.0.0"))
                .with_dependency(id("org.widgets/button@1.2.0")),
        ]
    }

    async fn check_widget_graph(repository: &dyn ComponentRepository) {
        let resolved = repository
            .resolve(&[id("org.widgets/button@1.2.0")])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);

        let graph = &resolved[0];
        assert_eq!(graph.id(), &id("org.widgets/button@1.2.0"));
        let deps: Vec<String> = graph
            .dependencies
            .iter()
            .map(|c| c.id.to_string())
            .collect();
        // unversioned theme resolves to the highest version, which icon also
        // asks for; the cycle back to button is dropped
        assert_eq!(
            deps,
            vec!["org.widgets/icon@1.0.0", "org.widgets/theme@2.0.0"]
        );
    }

    #[tokio::test]
    async fn test_memory_scope_resolves_graph() {
        let scope = MemoryScope::with_components(widget_components());
        check_widget_graph(&scope).await;
    }

    #[tokio::test]
    async fn test_local_scope_resolves_graph() {
        let temp = tempdir().unwrap();
        let scope = LocalScope::new(temp.path());
        for component in widget_components() {
            scope.put(&component).await.unwrap();
        }
        check_widget_graph(&scope).await;

        let button = scope.get(&id("org.widgets/button")).await.unwrap();
        assert_eq!(button.files.len(), 1);
        assert_eq!(
            button.package_dependencies.get("lodash").map(String::as_str),
            Some("^4.0.0")
        );
    }

    #[tokio::test]
    async fn test_missing_primary() {
        let scope = MemoryScope::with_components(widget_components());
        let err = scope.resolve(&[id("org.widgets/slider")]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::NotFound { .. })
        ));

        let err = scope
            .resolve(&[id("org.widgets/button@9.9.9")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::VersionNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_dependency() {
        let scope = MemoryScope::new();
        scope
            .put(
                ResolvedComponent::new(id("org/card@1.0.0"))
                    .with_dependency(id("org/shadow@1.0.0")),
            )
            .await;

        let err = scope.resolve(&[id("org/card@1.0.0")]).await.unwrap_err();
        match err {
            Error::Resolution(ResolutionError::DependencyNotFound {
                component,
                dependency,
            }) => {
                assert_eq!(component, "org/card@1.0.0");
                assert_eq!(dependency, "org/shadow@1.0.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_many_fails_if_any_missing() {
        let scope = MemoryScope::with_components(widget_components());
        let result = scope
            .resolve(&[id("org.widgets/icon@1.0.0"), id("org.widgets/nope")])
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_select_version_prefers_unversioned_record() {
        let available = vec![id("org/a@1.0.0"), id("org/a"), id("org/a@3.0.0")];
        assert_eq!(select_version(&id("org/a"), &available).unwrap(), id("org/a"));

        let available = vec![id("org/a@1.0.0"), id("org/a@3.0.0"), id("org/b@9.0.0")];
        assert_eq!(
            select_version(&id("org/a"), &available).unwrap(),
            id("org/a@3.0.0")
        );
    }
}
