//! Filesystem-backed component repository

use crate::{select_version, ComponentRepository};
use capsule_errors::{Error, ResolutionError};
use capsule_types::id::UNVERSIONED_DIR;
use capsule_types::{ComponentId, ResolvedComponent, Version};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Metadata directory kept at the root of every scope
pub const SCOPE_DIR: &str = ".capsule";

/// Record directory under [`SCOPE_DIR`]
pub const OBJECTS_DIR: &str = "objects";

const RECORD_EXTENSION: &str = "json";

/// Repository storing one JSON record per component version at
/// `<root>/.capsule/objects/<scope>/<name>/<version>.json`
#[derive(Debug, Clone)]
pub struct LocalScope {
    root: PathBuf,
}

impl LocalScope {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn objects_dir(&self) -> PathBuf {
        self.root.join(SCOPE_DIR).join(OBJECTS_DIR)
    }

    /// Location of the record for `id`
    #[must_use]
    pub fn record_path(&self, id: &ComponentId) -> PathBuf {
        let [scope, name, version] = id.path_segments();
        self.objects_dir()
            .join(scope)
            .join(name)
            .join(format!("{version}.{RECORD_EXTENSION}"))
    }

    /// Store or replace the record for `component`
    ///
    /// # Errors
    ///
    /// Returns an error if the record directory cannot be created or the
    /// record cannot be written.
    pub async fn put(&self, component: &ResolvedComponent) -> Result<PathBuf, Error> {
        let path = self.record_path(&component.id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        let json = serde_json::to_vec_pretty(component)?;
        fs::write(&path, json)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;
        Ok(path)
    }

    /// All stored versions of the component named by `id`
    ///
    /// # Errors
    ///
    /// Returns an error if the component's record directory exists but
    /// cannot be read.
    pub async fn versions(&self, id: &ComponentId) -> Result<Vec<ComponentId>, Error> {
        let [scope, name, _] = id.path_segments();
        let dir = self.objects_dir().join(scope).join(name);
        match fs::metadata(&dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io_with_path(&e, &dir)),
        }

        let mut found = Vec::new();
        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &dir))?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map_err(|e| Error::io_with_path(&e, &path))?
                .is_file();
            if !is_file || path.extension().and_then(|s| s.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let unversioned = id.without_version();
            if stem == UNVERSIONED_DIR {
                found.push(unversioned);
                continue;
            }
            match Version::parse(stem) {
                Ok(version) => found.push(unversioned.with_version(version)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping record with unparseable version");
                }
            }
        }
        Ok(found)
    }
}

#[async_trait::async_trait]
impl ComponentRepository for LocalScope {
    async fn get(&self, id: &ComponentId) -> Result<ResolvedComponent, Error> {
        let available = self.versions(id).await?;
        let selected = select_version(id, &available)?;
        let path = self.record_path(&selected);

        let bytes = fs::read(&path)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;
        let component: ResolvedComponent =
            serde_json::from_slice(&bytes).map_err(|e| ResolutionError::CorruptRecord {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        if component.id != selected {
            return Err(ResolutionError::CorruptRecord {
                path: path.display().to_string(),
                message: format!("record describes {} instead of {selected}", component.id),
            }
            .into());
        }

        Ok(component)
    }
}
