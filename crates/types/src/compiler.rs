//! Compiler capability of an environment
//!
//! An environment either has a compiler or it does not. The variant is fixed
//! when the environment is built and never queried again afterwards.

use serde::{Deserialize, Serialize};

/// Description of the compiler an environment was configured with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl CompilerDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            display_name: None,
            config: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompilerCapability {
    HasCompiler(CompilerDescriptor),
    #[default]
    NoCompiler,
}

impl CompilerCapability {
    /// Build from an optional descriptor
    #[must_use]
    pub fn from_descriptor(descriptor: Option<CompilerDescriptor>) -> Self {
        descriptor.map_or(Self::NoCompiler, Self::HasCompiler)
    }

    #[must_use]
    pub fn descriptor(&self) -> Option<&CompilerDescriptor> {
        match self {
            Self::HasCompiler(descriptor) => Some(descriptor),
            Self::NoCompiler => None,
        }
    }

    #[must_use]
    pub fn has_compiler(&self) -> bool {
        matches!(self, Self::HasCompiler(_))
    }
}
