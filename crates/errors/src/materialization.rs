//! Error types for writing resolved components onto disk

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum MaterializationError {
    #[error("refusing to overwrite existing file {path}")]
    Conflict { path: String },

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("invalid file path {path} in component {component}")]
    InvalidPath { component: String, path: String },

    #[error("I/O failure at {path}: {message}")]
    Io { path: String, message: String },

    #[error("materialization failed: {message}")]
    Failed { message: String },
}

impl MaterializationError {
    /// Classify an I/O failure on a specific path
    pub fn from_io(err: &std::io::Error, path: impl Into<String>) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::AlreadyExists => Self::Conflict { path },
            _ => Self::Io {
                path,
                message: err.to_string(),
            },
        }
    }
}

impl UserFacingError for MaterializationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Conflict { .. } => {
                Some("Pass --override to replace existing files, or destroy the environment first.")
            }
            Self::PermissionDenied { .. } => Some("Ensure the destination directory is writable."),
            Self::InvalidPath { .. } => {
                Some("Component files must use relative paths that stay inside the component.")
            }
            Self::Io { .. } | Self::Failed { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Conflict { .. } => "materialization.conflict",
            Self::PermissionDenied { .. } => "materialization.permission_denied",
            Self::InvalidPath { .. } => "materialization.invalid_path",
            Self::Io { .. } => "materialization.io",
            Self::Failed { .. } => "materialization.failed",
        };
        Some(code)
    }
}
