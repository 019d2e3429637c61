#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for capsule
//!
//! This crate provides the data model shared by the repository, writer,
//! package-manager client and environment crates: component identifiers,
//! resolved component graphs and the switches that drive isolation.

pub mod compiler;
pub mod component;
pub mod id;
pub mod options;

// Re-export commonly used types
pub use compiler::{CompilerCapability, CompilerDescriptor};
pub use component::{
    ComponentFile, ComponentWithDependencies, PackageDependencies, ResolvedComponent, ToolConfig,
};
pub use id::ComponentId;
pub use options::{IsolationOptions, WriteDirectives};
pub use semver::Version;
