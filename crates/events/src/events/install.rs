use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Third-party package installation events, one series per component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Package-manager invocation launched
    Started {
        component: String,
        cwd: PathBuf,
        packages: Vec<String>,
    },

    /// Package-manager invocation finished successfully
    Completed { component: String, cwd: PathBuf },

    /// Package-manager invocation failed
    Failed {
        component: String,
        cwd: PathBuf,
        failure: FailureContext,
    },

    /// Component declares no third-party packages
    Skipped { component: String },

    /// Output line relayed from the package manager in verbose mode
    Output { component: String, line: String },
}
