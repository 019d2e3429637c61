#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for capsule
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone for easier handling across task boundaries.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod identifier;
pub mod install;
pub mod materialization;
pub mod resolution;
pub mod sandbox;

// Re-export all error types at the root
pub use config::ConfigError;
pub use identifier::IdentifierError;
pub use install::InstallError;
pub use materialization::MaterializationError;
pub use resolution::ResolutionError;
pub use sandbox::SandboxError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    #[error("resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("materialization error: {0}")]
    Materialization(#[from] MaterializationError),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        #[cfg_attr(feature = "serde", serde(with = "io_kind_as_str"))]
        kind: std::io::ErrorKind,
        message: String,
        #[cfg_attr(feature = "serde", serde(with = "opt_path_buf"))]
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<std::path::PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Re-tag an error raised while resolving components.
    ///
    /// Errors that already belong to the resolution or identifier domains pass through.
    #[must_use]
    pub fn into_resolution(self) -> Self {
        match self {
            Self::Resolution(_) | Self::Identifier(_) => self,
            other => ResolutionError::Failed {
                message: other.to_string(),
            }
            .into(),
        }
    }

    /// Re-tag an error raised while writing components to disk.
    #[must_use]
    pub fn into_materialization(self) -> Self {
        match self {
            Self::Materialization(_) => self,
            Self::Io { message, path, .. } => MaterializationError::Io {
                path: path.map(|p| p.display().to_string()).unwrap_or_default(),
                message,
            }
            .into(),
            other => MaterializationError::Failed {
                message: other.to_string(),
            }
            .into(),
        }
    }

    /// Re-tag an error raised by the package-manager client.
    #[must_use]
    pub fn into_install(self) -> Self {
        match self {
            Self::Install(_) => self,
            other => InstallError::Failed {
                message: other.to_string(),
            }
            .into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for capsule operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for analytics / structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Install(err) => err.user_message(),
            Error::Materialization(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Identifier(err) => err.user_hint(),
            Error::Resolution(err) => err.user_hint(),
            Error::Materialization(err) => err.user_hint(),
            Error::Install(err) => err.user_hint(),
            Error::Sandbox(err) => err.user_hint(),
            Error::Config(err) => err
                .user_hint()
                .or(Some("Check your capsule configuration file.")),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Install(err) => err.is_retryable(),
            Error::Sandbox(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Identifier(err) => err.user_code(),
            Error::Resolution(err) => err.user_code(),
            Error::Materialization(err) => err.user_code(),
            Error::Install(err) => err.user_code(),
            Error::Sandbox(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}

// Serde helper modules for optional path and io::ErrorKind as string
#[cfg(feature = "serde")]
mod io_kind_as_str {
    use serde::{Deserialize, Deserializer, Serializer};
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(kind: &std::io::ErrorKind, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("{kind:?}"))
    }
    pub fn deserialize<'de, D>(deserializer: D) -> Result<std::io::ErrorKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "NotFound" => std::io::ErrorKind::NotFound,
            "PermissionDenied" => std::io::ErrorKind::PermissionDenied,
            "AlreadyExists" => std::io::ErrorKind::AlreadyExists,
            "InvalidInput" => std::io::ErrorKind::InvalidInput,
            "InvalidData" => std::io::ErrorKind::InvalidData,
            "StorageFull" => std::io::ErrorKind::StorageFull,
            "ReadOnlyFilesystem" => std::io::ErrorKind::ReadOnlyFilesystem,
            "DirectoryNotEmpty" => std::io::ErrorKind::DirectoryNotEmpty,
            "Interrupted" => std::io::ErrorKind::Interrupted,
            "Unsupported" => std::io::ErrorKind::Unsupported,
            "UnexpectedEof" => std::io::ErrorKind::UnexpectedEof,
            _ => std::io::ErrorKind::Other,
        })
    }
}

#[cfg(feature = "serde")]
mod opt_path_buf {
    use serde::{Deserialize, Deserializer, Serializer};
    #[allow(clippy::ref_option)]
    pub fn serialize<S>(path: &Option<std::path::PathBuf>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match path {
            Some(pb) => s.serialize_some(&pb.display().to_string()),
            None => s.serialize_none(),
        }
    }
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<std::path::PathBuf>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        Ok(opt.map(std::path::PathBuf::from))
    }
}
