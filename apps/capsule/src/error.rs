//! CLI error handling

use std::fmt;
use std::path::{Path, PathBuf};

use capsule_errors::{ConfigError, Error, UserFacingError};
use serde::Serialize;

/// Failure of a capsule command
#[derive(Debug)]
pub enum CliError {
    /// A configuration, repository or environment operation failed
    Capsule(Error),
    /// Isolation failed and the sandbox was left behind for inspection
    SandboxKept { sandbox: PathBuf, source: Error },
    /// Local I/O outside the environment, such as resolving a path argument
    Io(std::io::Error),
}

/// Machine-readable form of a [`CliError`], printed under `--json`
#[derive(Debug, Serialize)]
pub struct ErrorReport<'a> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a Error>,
}

impl CliError {
    fn capsule_error(&self) -> Option<&Error> {
        match self {
            Self::Capsule(e) | Self::SandboxKept { source: e, .. } => Some(e),
            Self::Io(_) => None,
        }
    }

    /// Sandbox directory left on disk by the failed command
    #[must_use]
    pub fn sandbox(&self) -> Option<&Path> {
        match self {
            Self::SandboxKept { sandbox, .. } => Some(sandbox),
            _ => None,
        }
    }

    #[must_use]
    pub fn report(&self) -> ErrorReport<'_> {
        let error = self.capsule_error();
        ErrorReport {
            message: error.map_or_else(|| self.to_string(), |e| e.user_message().into_owned()),
            code: error.map_or(Some("error.io"), UserFacingError::user_code),
            hint: error.and_then(UserFacingError::user_hint),
            retryable: error.is_none_or(UserFacingError::is_retryable),
            sandbox: self.sandbox(),
            error,
        }
    }
}

fn write_user_facing(f: &mut fmt::Formatter<'_>, e: &Error) -> fmt::Result {
    write!(f, "{}", e.user_message())?;
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    if e.is_retryable() {
        write!(f, "\n  Retry: safe to retry this operation.")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Capsule(e) => write_user_facing(f, e),
            CliError::SandboxKept { sandbox, source } => {
                write_user_facing(f, source)?;
                write!(
                    f,
                    "\n  Sandbox: left at {}, remove it with `capsule destroy`",
                    sandbox.display()
                )
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Capsule(e) | CliError::SandboxKept { source: e, .. } => Some(e),
            CliError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Capsule(e.into())
    }
}

impl From<Error> for CliError {
    fn from(e: Error) -> Self {
        CliError::Capsule(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
