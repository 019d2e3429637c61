//! Transitive resolution of component graphs

use crate::ComponentRepository;
use capsule_errors::{Error, ResolutionError};
use capsule_types::{ComponentId, ComponentWithDependencies};
use std::collections::{HashSet, VecDeque};

/// Resolve `id` and walk its internal dependencies breadth-first.
///
/// Dependencies are de-duplicated by resolved id and kept in first-discovery
/// order; the primary never appears among its own dependencies, even when a
/// dependency cycles back to it.
///
/// # Errors
///
/// Returns `ResolutionError::NotFound`/`VersionNotFound` for a missing primary
/// and `ResolutionError::DependencyNotFound` for a missing dependency.
pub async fn resolve_component<R>(
    repository: &R,
    id: &ComponentId,
) -> Result<ComponentWithDependencies, Error>
where
    R: ComponentRepository + ?Sized,
{
    let primary = repository.get(id).await?;

    let mut seen: HashSet<ComponentId> = HashSet::from([primary.id.clone()]);
    let mut queue: VecDeque<(ComponentId, ComponentId)> = primary
        .dependencies
        .iter()
        .map(|dep| (primary.id.clone(), dep.clone()))
        .collect();
    let mut dependencies = Vec::new();

    while let Some((requester, wanted)) = queue.pop_front() {
        if seen.contains(&wanted) {
            continue;
        }

        let dependency = repository.get(&wanted).await.map_err(|e| match e {
            Error::Resolution(
                ResolutionError::NotFound { .. } | ResolutionError::VersionNotFound { .. },
            ) => ResolutionError::DependencyNotFound {
                component: requester.to_string(),
                dependency: wanted.to_string(),
            }
            .into(),
            other => other,
        })?;

        if !seen.insert(dependency.id.clone()) {
            continue;
        }
        queue.extend(
            dependency
                .dependencies
                .iter()
                .map(|dep| (dependency.id.clone(), dep.clone())),
        );
        dependencies.push(dependency);
    }

    tracing::debug!(
        component = %primary.id,
        dependencies = dependencies.len(),
        "resolved component graph"
    );

    Ok(ComponentWithDependencies::new(primary, dependencies))
}
