#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Component repositories for capsule
//!
//! A repository ("scope") stores component records and resolves an id into
//! the component plus its transitive dependency graph. Two implementations
//! are provided: [`LocalScope`], backed by JSON records on disk, and
//! [`MemoryScope`], kept entirely in memory.

mod local;
mod memory;
mod resolve;

pub use local::{LocalScope, OBJECTS_DIR, SCOPE_DIR};
pub use memory::MemoryScope;
pub use resolve::resolve_component;

use capsule_errors::{Error, ResolutionError};
use capsule_types::{ComponentId, ComponentWithDependencies, ResolvedComponent};

/// Read access to a component repository
#[async_trait::async_trait]
pub trait ComponentRepository: Send + Sync {
    /// Fetch one component record.
    ///
    /// An id without a version selects the unversioned record if there is
    /// one, otherwise the highest stored version.
    async fn get(&self, id: &ComponentId) -> Result<ResolvedComponent, Error>;

    /// Resolve each id into its component and transitive dependencies.
    ///
    /// Fails as a whole if any id or dependency is missing.
    async fn resolve(&self, ids: &[ComponentId]) -> Result<Vec<ComponentWithDependencies>, Error> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            resolved.push(resolve_component(self, id).await?);
        }
        Ok(resolved)
    }
}

/// Pick the record matching `wanted` among the ids a repository holds.
///
/// # Errors
///
/// Returns `ResolutionError::VersionNotFound` if the component exists under
/// other versions only, `ResolutionError::NotFound` if it does not exist.
pub fn select_version<'a, I>(wanted: &ComponentId, available: I) -> Result<ComponentId, Error>
where
    I: IntoIterator<Item = &'a ComponentId>,
{
    let candidates: Vec<&ComponentId> = available
        .into_iter()
        .filter(|id| id.same_component(wanted))
        .collect();

    if let Some(exact) = candidates.iter().find(|id| **id == wanted) {
        return Ok((*exact).clone());
    }

    match wanted.version() {
        Some(version) if !candidates.is_empty() => Err(ResolutionError::VersionNotFound {
            id: wanted.without_version().to_string(),
            version: version.to_string(),
        }
        .into()),
        Some(_) => Err(not_found(wanted)),
        None => candidates
            .into_iter()
            .filter(|id| id.version().is_some())
            .max_by(|a, b| a.version().cmp(&b.version()))
            .cloned()
            .ok_or_else(|| not_found(wanted)),
    }
}

fn not_found(id: &ComponentId) -> Error {
    ResolutionError::NotFound { id: id.to_string() }.into()
}
