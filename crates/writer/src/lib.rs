#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Materialization of resolved component graphs onto disk
//!
//! The [`ComponentWriter`] trait is the seam the environment writes through;
//! [`FsWriter`] is the filesystem implementation. A [`Workspace`] is the
//! session opened on a destination before anything is written into it.

mod fs_writer;
mod manifest;
mod workspace;

pub use fs_writer::{FsWriter, DEPENDENCIES_DIR, DIST_DIR, LINK_NAMESPACE};
pub use manifest::{CONFIG_FILE, PACKAGE_JSON};
pub use workspace::{Workspace, WorkspaceInfo, WORKSPACE_FILE};

use capsule_errors::Error;
use capsule_types::{ComponentWithDependencies, WriteDirectives};

/// Writes resolved components into a workspace
#[async_trait::async_trait]
pub trait ComponentWriter: Send + Sync {
    /// Write every graph according to `directives` and hand the graphs back
    /// with each component's `written_path` filled in.
    ///
    /// Partial writes are left in place on failure.
    async fn write(
        &self,
        workspace: &Workspace,
        components: Vec<ComponentWithDependencies>,
        directives: &WriteDirectives,
    ) -> Result<Vec<ComponentWithDependencies>, Error>;
}
