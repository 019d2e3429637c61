//! Sandbox directory and environment lifecycle error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SandboxError {
    #[error("failed to create sandbox {path}: {message}")]
    CreateFailed { path: String, message: String },

    #[error("failed to remove sandbox {path}: {message}")]
    RemoveFailed { path: String, message: String },

    #[error("cannot {operation} while environment is {state}")]
    InvalidState { operation: String, state: String },

    #[error("{path} is not inside the environments root {root}")]
    OutsideRoot { path: String, root: String },
}

impl UserFacingError for SandboxError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CreateFailed { .. } => {
                Some("Check permissions and free space under the environments directory.")
            }
            Self::RemoveFailed { .. } => Some("Fix the permissions and destroy the environment again."),
            Self::InvalidState { .. } => Some("Call create() before isolating components."),
            Self::OutsideRoot { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoveFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::CreateFailed { .. } => "sandbox.create_failed",
            Self::RemoveFailed { .. } => "sandbox.remove_failed",
            Self::InvalidState { .. } => "sandbox.invalid_state",
            Self::OutsideRoot { .. } => "sandbox.outside_root",
        };
        Some(code)
    }
}
