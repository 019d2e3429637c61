//! Package installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("installation failed: {message}")]
    Failed { message: String },

    #[error("failed to launch `{program}`: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("`{command}` exited with {status} in {cwd}: {stderr}")]
    CommandFailed {
        command: String,
        cwd: String,
        status: String,
        stderr: String,
    },

    #[error("component {component} has no written directory to install into")]
    MissingWrittenPath { component: String },

    #[error("task execution failed: {message}")]
    TaskError { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SpawnFailed { .. } => {
                Some("Ensure the package manager is installed and on PATH, or set install.program.")
            }
            Self::CommandFailed { .. } => {
                Some("Re-run with --verbose to see the package manager output.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::CommandFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Failed { .. } => "install.failed",
            Self::SpawnFailed { .. } => "install.spawn_failed",
            Self::CommandFailed { .. } => "install.command_failed",
            Self::MissingWrittenPath { .. } => "install.missing_written_path",
            Self::TaskError { .. } => "install.task_error",
        };
        Some(code)
    }
}
