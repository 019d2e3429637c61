//! Sandbox path allocation

use capsule_config::Config;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Hands out unique sandbox directories under a root
///
/// Allocation is pure: nothing is created on disk until the environment is
/// provisioned.
#[derive(Debug, Clone)]
pub struct SandboxPathAllocator {
    root: PathBuf,
}

impl SandboxPathAllocator {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Allocator rooted at the configured environments directory
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.environments_dir())
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A fresh `<root>/<uuid-v4>` path
    #[must_use]
    pub fn allocate(&self) -> PathBuf {
        self.root.join(Uuid::new_v4().to_string())
    }

    /// Whether `path` is a sandbox directly under this root
    #[must_use]
    pub fn owns(&self, path: &Path) -> bool {
        path.parent() == Some(self.root.as_path())
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| Uuid::parse_str(name).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_allocate_is_unique_and_under_root() {
        let allocator = SandboxPathAllocator::new("/srv/scope/environment");
        let paths: HashSet<PathBuf> = (0..64).map(|_| allocator.allocate()).collect();
        assert_eq!(paths.len(), 64);
        for path in &paths {
            assert!(allocator.owns(path));
            assert!(!path.exists());
        }
    }

    #[test]
    fn test_owns_rejects_foreign_paths() {
        let allocator = SandboxPathAllocator::new("/srv/scope/environment");
        assert!(!allocator.owns(Path::new("/srv/scope/environment")));
        assert!(!allocator.owns(Path::new("/srv/scope/environment/not-a-uuid")));
        assert!(!allocator.owns(Path::new("/tmp/5f0c6a9e-7d1b-4c1e-9d8e-3f1a2b3c4d5e")));
        assert!(allocator.owns(Path::new(
            "/srv/scope/environment/5f0c6a9e-7d1b-4c1e-9d8e-3f1a2b3c4d5e"
        )));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.paths.scope_path = Some(PathBuf::from("/srv/scope"));
        let allocator = SandboxPathAllocator::from_config(&config);
        assert_eq!(allocator.root(), Path::new("/srv/scope/environment"));
    }
}
