#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Isolated component environments
//!
//! An [`Environment`] owns one disposable sandbox directory. It pulls a
//! component and its transitive dependencies out of a repository, writes them
//! into the sandbox and optionally installs their third-party packages:
//!
//! 1. [`SandboxPathAllocator`] picks a fresh directory under a configured root
//! 2. [`Environment::create`] provisions it and opens a workspace session
//! 3. [`Environment::isolate`] resolves, writes and installs
//! 4. [`Environment::destroy`] removes the directory again

mod allocator;
mod environment;
mod installer;

pub use allocator::SandboxPathAllocator;
pub use environment::{Environment, EnvironmentState, IntoComponentId, COMPONENTS_DIR};
pub use installer::{DependencyInstaller, InstallOutcome};
