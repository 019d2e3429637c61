//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields.

use capsule_events::{AppEvent, EnvironmentEvent, GeneralEvent, InstallEvent};
use tracing::{debug, error, info, warn};

/// Log an `AppEvent` at its level with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                warn!(context = ?context, "{message}");
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(context = ?context, "{message}");
            }
            GeneralEvent::OperationStarted { operation } => {
                info!(operation = %operation, "Operation started");
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(operation = %operation, success = success, "Operation completed");
            }
            GeneralEvent::OperationFailed { operation, error } => {
                error!(operation = %operation, error = %error, "Operation failed");
            }
        },

        AppEvent::Environment(environment) => match environment {
            EnvironmentEvent::Created { path } => {
                info!(path = %path.display(), "Environment created");
            }
            EnvironmentEvent::Isolating {
                component,
                destination,
                install_packages,
            } => {
                info!(
                    component = %component,
                    destination = %destination.display(),
                    install_packages = install_packages,
                    "Isolating component"
                );
            }
            EnvironmentEvent::Isolated {
                component,
                destination,
                dependency_count,
            } => {
                info!(
                    component = %component,
                    destination = %destination.display(),
                    dependency_count = dependency_count,
                    "Component isolated"
                );
            }
            EnvironmentEvent::Destroyed { path } => {
                info!(path = %path.display(), "Environment destroyed");
            }
        },

        AppEvent::Install(install) => match install {
            InstallEvent::Started {
                component,
                cwd,
                packages,
            } => {
                info!(
                    component = %component,
                    cwd = %cwd.display(),
                    packages = ?packages,
                    "Package install started"
                );
            }
            InstallEvent::Completed { component, cwd } => {
                info!(component = %component, cwd = %cwd.display(), "Package install completed");
            }
            InstallEvent::Failed {
                component,
                cwd,
                failure,
            } => {
                error!(
                    component = %component,
                    cwd = %cwd.display(),
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Package install failed"
                );
            }
            InstallEvent::Skipped { component } => {
                debug!(component = %component, "No packages to install");
            }
            InstallEvent::Output { component, line } => {
                debug!(component = %component, "{line}");
            }
        },
    }
}
