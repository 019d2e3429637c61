//! Isolation switches and the write directives derived from them

use crate::CompilerCapability;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Caller-facing switches for a single isolation
///
/// Every switch is independent; none implies another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IsolationOptions {
    /// Write into this path instead of the environment's sandbox
    pub write_to_path: Option<PathBuf>,
    /// Overwrite files that already exist at the destination
    #[serde(rename = "override")]
    pub override_existing: bool,
    /// Do not generate `package.json` for written components
    pub no_package_json: bool,
    /// Also write each component's tool configuration file
    pub conf: bool,
    /// Write repository-native dependency records next to the components
    #[serde(alias = "writeBitDependencies")]
    pub write_internal_dependencies: bool,
    /// Generate link shims for local dependencies
    #[serde(alias = "createNpmLinkFiles")]
    pub create_link_files: bool,
    /// Also materialize build output
    pub dist: bool,
    /// Install third-party packages after writing
    pub install_packages: bool,
    /// Forwarded to the package-manager client
    pub verbose: bool,
}

impl IsolationOptions {
    #[must_use]
    pub fn with_write_to_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.write_to_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_override(mut self, value: bool) -> Self {
        self.override_existing = value;
        self
    }

    #[must_use]
    pub fn with_install_packages(mut self, value: bool) -> Self {
        self.install_packages = value;
        self
    }

    #[must_use]
    pub fn with_internal_dependencies(mut self, value: bool) -> Self {
        self.write_internal_dependencies = value;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Derive the writer's directives, falling back to `sandbox` when no
    /// explicit destination was requested
    #[must_use]
    pub fn directives(&self, sandbox: &Path, compiler: &CompilerCapability) -> WriteDirectives {
        WriteDirectives {
            write_to_path: self
                .write_to_path
                .clone()
                .unwrap_or_else(|| sandbox.to_path_buf()),
            force: self.override_existing,
            with_package_json: !self.no_package_json,
            with_config: self.conf,
            write_internal_dependencies: self.write_internal_dependencies,
            create_link_files: self.create_link_files,
            dist: self.dist,
            compiler: compiler.clone(),
        }
    }
}

/// Instructions handed to the component writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteDirectives {
    pub write_to_path: PathBuf,
    pub force: bool,
    pub with_package_json: bool,
    pub with_config: bool,
    pub write_internal_dependencies: bool,
    pub create_link_files: bool,
    pub dist: bool,
    pub compiler: CompilerCapability,
}

impl WriteDirectives {
    /// Directives with every optional output disabled except `package.json`
    #[must_use]
    pub fn new(write_to_path: impl Into<PathBuf>) -> Self {
        IsolationOptions::default().directives(&write_to_path.into(), &CompilerCapability::NoCompiler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let directives =
            IsolationOptions::default().directives(Path::new("/sandbox"), &CompilerCapability::NoCompiler);
        assert_eq!(directives.write_to_path, PathBuf::from("/sandbox"));
        assert!(directives.with_package_json);
        assert!(!directives.force);
        assert!(!directives.with_config);
        assert!(!directives.write_internal_dependencies);
        assert!(!directives.create_link_files);
        assert!(!directives.dist);
    }

    #[test]
    fn test_switches_are_independent() {
        let options = IsolationOptions {
            no_package_json: true,
            dist: true,
            ..IsolationOptions::default()
        }
        .with_write_to_path("/elsewhere");
        let directives = options.directives(Path::new("/sandbox"), &CompilerCapability::NoCompiler);
        assert_eq!(directives.write_to_path, PathBuf::from("/elsewhere"));
        assert!(!directives.with_package_json);
        assert!(directives.dist);
        assert!(!directives.force);
        assert!(!directives.with_config);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: IsolationOptions = serde_json::from_str(
            r#"{"override": true, "writeBitDependencies": true, "installPackages": true}"#,
        )
        .unwrap();
        assert!(options.override_existing);
        assert!(options.write_internal_dependencies);
        assert!(options.install_packages);
        assert!(!options.verbose);
    }
}
