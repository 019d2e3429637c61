#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Package-manager client for capsule
//!
//! [`PackageManagerClient`] is the seam the dependency installer calls once
//! per component; [`NpmClient`] drives an npm-compatible executable.

mod client;

pub use client::NpmClient;

use capsule_errors::Error;
use capsule_types::PackageDependencies;
use std::path::Path;

/// Installs third-party packages into a directory
#[async_trait::async_trait]
pub trait PackageManagerClient: Send + Sync {
    /// Install `dependencies` with `cwd` as the working directory.
    ///
    /// `verbose` is passed through from the caller; what it changes is up to
    /// the implementation.
    async fn install(
        &self,
        dependencies: &PackageDependencies,
        cwd: &Path,
        verbose: bool,
    ) -> Result<(), Error>;
}
