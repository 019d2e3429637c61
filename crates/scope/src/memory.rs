//! In-memory component repository

use crate::{select_version, ComponentRepository};
use capsule_errors::Error;
use capsule_types::{ComponentId, ResolvedComponent};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Repository that keeps every record in memory
///
/// Cloning is cheap and clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryScope {
    components: Arc<RwLock<BTreeMap<ComponentId, ResolvedComponent>>>,
}

impl MemoryScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository pre-populated with `components`
    pub fn with_components(components: impl IntoIterator<Item = ResolvedComponent>) -> Self {
        let map = components
            .into_iter()
            .map(|mut component| {
                component.written_path = None;
                (component.id.clone(), component)
            })
            .collect();
        Self {
            components: Arc::new(RwLock::new(map)),
        }
    }

    /// Store or replace a record
    pub async fn put(&self, mut component: ResolvedComponent) {
        component.written_path = None;
        self.components
            .write()
            .await
            .insert(component.id.clone(), component);
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.components.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.components.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl ComponentRepository for MemoryScope {
    async fn get(&self, id: &ComponentId) -> Result<ResolvedComponent, Error> {
        let components = self.components.read().await;
        let selected = select_version(id, components.keys())?;
        components
            .get(&selected)
            .cloned()
            .ok_or_else(|| Error::internal(format!("record for {selected} vanished")))
    }
}
