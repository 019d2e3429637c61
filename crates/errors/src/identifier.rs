//! Component identifier parsing error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum IdentifierError {
    #[error("empty component identifier")]
    Empty,

    #[error("malformed component identifier `{input}`: {reason}")]
    Malformed { input: String, reason: String },

    #[error("invalid version in `{input}`: {message}")]
    InvalidVersion { input: String, message: String },
}

impl UserFacingError for IdentifierError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Empty | Self::Malformed { .. } => {
                Some("Use the form `scope/name@1.2.3`; scope and version are optional.")
            }
            Self::InvalidVersion { .. } => {
                Some("Component versions must be semantic versions such as 1.2.3.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Empty => "identifier.empty",
            Self::Malformed { .. } => "identifier.malformed",
            Self::InvalidVersion { .. } => "identifier.invalid_version",
        };
        Some(code)
    }
}
