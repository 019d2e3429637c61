use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sandbox lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EnvironmentEvent {
    /// Sandbox directory provisioned and session opened
    Created { path: PathBuf },

    /// A component is being pulled into the sandbox
    Isolating {
        component: String,
        destination: PathBuf,
        install_packages: bool,
    },

    /// Component and its dependencies were written
    Isolated {
        component: String,
        destination: PathBuf,
        dependency_count: usize,
    },

    /// Sandbox directory removed
    Destroyed { path: PathBuf },
}
