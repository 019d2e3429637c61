use serde::{Deserialize, Serialize};
use tracing::Level;

use capsule_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code, when the error provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod environment;
pub mod general;
pub mod install;

pub use environment::*;
pub use general::*;
pub use install::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, debug, operations)
    General(GeneralEvent),

    /// Sandbox lifecycle and isolation events
    Environment(EnvironmentEvent),

    /// Third-party package installation events
    Install(InstallEvent),
}

impl AppEvent {
    /// Severity used when routing this event to the log
    #[must_use]
    pub fn level(&self) -> Level {
        match self {
            Self::General(GeneralEvent::Warning { .. }) => Level::WARN,
            Self::General(GeneralEvent::OperationFailed { .. }) | Self::Install(InstallEvent::Failed { .. }) => {
                Level::ERROR
            }
            Self::General(GeneralEvent::DebugLog { .. }) | Self::Install(InstallEvent::Skipped { .. }) => {
                Level::DEBUG
            }
            _ => Level::INFO,
        }
    }
}
