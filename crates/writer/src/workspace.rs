//! Workspace session opened on a sandbox

use capsule_errors::Error;
use capsule_scope::SCOPE_DIR;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Session marker written into every workspace
pub const WORKSPACE_FILE: &str = "workspace.json";

/// Persisted description of a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub created_at: DateTime<Utc>,
    /// Repository the workspace pulls components from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_scope: Option<PathBuf>,
}

/// Handle on a directory components are written into
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    info: WorkspaceInfo,
}

impl Workspace {
    /// Open a workspace rooted at `root`, writing the session marker.
    ///
    /// The root directory must already exist. Re-opening keeps the original
    /// creation time; an unreadable marker is logged and replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the marker cannot be read or written.
    pub async fn open(root: impl Into<PathBuf>, source_scope: Option<&Path>) -> Result<Self, Error> {
        let root = root.into();
        let marker = Self::marker_path(&root);

        let existing = match fs::read(&marker).await {
            Ok(bytes) => match serde_json::from_slice::<WorkspaceInfo>(&bytes) {
                Ok(info) => Some(info),
                Err(e) => {
                    tracing::warn!(
                        path = %marker.display(),
                        error = %e,
                        "replacing unreadable workspace marker"
                    );
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::io_with_path(&e, &marker)),
        };

        let info = WorkspaceInfo {
            created_at: existing.map_or_else(Utc::now, |info| info.created_at),
            source_scope: source_scope.map(Path::to_path_buf),
        };

        if let Some(parent) = marker.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_path(&e, parent))?;
        }
        fs::write(&marker, serde_json::to_vec_pretty(&info)?)
            .await
            .map_err(|e| Error::io_with_path(&e, &marker))?;

        Ok(Self { root, info })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn info(&self) -> &WorkspaceInfo {
        &self.info
    }

    fn marker_path(root: &Path) -> PathBuf {
        root.join(SCOPE_DIR).join(WORKSPACE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reopen_keeps_creation_time() {
        let temp = tempdir().unwrap();
        let first = Workspace::open(temp.path(), Some(Path::new("/srv/scope")))
            .await
            .unwrap();
        assert!(temp.path().join(".capsule/workspace.json").is_file());

        let second = Workspace::open(temp.path(), None).await.unwrap();
        assert_eq!(first.info().created_at, second.info().created_at);
        assert!(second.info().source_scope.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_marker_is_replaced() {
        let temp = tempdir().unwrap();
        let marker = temp.path().join(".capsule/workspace.json");
        std::fs::create_dir_all(marker.parent().unwrap()).unwrap();
        std::fs::write(&marker, "{ not json").unwrap();

        let before = Utc::now();
        let workspace = Workspace::open(temp.path(), None).await.unwrap();
        assert!(workspace.info().created_at >= before);

        let rewritten: WorkspaceInfo =
            serde_json::from_slice(&std::fs::read(&marker).unwrap()).unwrap();
        assert_eq!(&rewritten, workspace.info());
    }
}
