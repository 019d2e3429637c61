//! Component resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("component not found: {id}")]
    NotFound { id: String },

    #[error("version {version} of {id} not found")]
    VersionNotFound { id: String, version: String },

    #[error("dependency {dependency} of {component} not found")]
    DependencyNotFound {
        component: String,
        dependency: String,
    },

    #[error("corrupt component record at {path}: {message}")]
    CorruptRecord { path: String, message: String },

    #[error("resolution failed: {message}")]
    Failed { message: String },
}

impl UserFacingError for ResolutionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::VersionNotFound { .. } => {
                Some("Check the component id and that the scope path points at the right repository.")
            }
            Self::DependencyNotFound { .. } => {
                Some("Import the missing dependency into the repository before isolating.")
            }
            Self::CorruptRecord { .. } => Some("Remove or re-export the damaged component record."),
            Self::Failed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "resolution.not_found",
            Self::VersionNotFound { .. } => "resolution.version_not_found",
            Self::DependencyNotFound { .. } => "resolution.dependency_not_found",
            Self::CorruptRecord { .. } => "resolution.corrupt_record",
            Self::Failed { .. } => "resolution.failed",
        };
        Some(code)
    }
}
