//! Event handling and user feedback

use crate::logging::log_event_with_tracing;
use capsule_events::{AppEvent, EnvironmentEvent, GeneralEvent, InstallEvent};

/// Turns library events into log records and status lines
pub struct EventHandler {
    /// Print status lines to stderr
    interactive: bool,
    /// Also surface debug events
    debug_enabled: bool,
}

impl EventHandler {
    pub fn new(json_mode: bool, debug_enabled: bool) -> Self {
        Self {
            interactive: !json_mode,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: &AppEvent) {
        log_event_with_tracing(event);
        if !self.interactive {
            return;
        }
        if let Some(line) = self.status_line(event) {
            eprintln!("{line}");
        }
    }

    fn status_line(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Environment(EnvironmentEvent::Created { path }) => {
                Some(format!("Created sandbox {}", path.display()))
            }
            AppEvent::Environment(EnvironmentEvent::Isolating { component, .. }) => {
                Some(format!("Isolating {component}"))
            }
            AppEvent::Environment(EnvironmentEvent::Isolated {
                component,
                dependency_count,
                ..
            }) => Some(format!(
                "Wrote {component} with {dependency_count} dependencies"
            )),
            AppEvent::Environment(EnvironmentEvent::Destroyed { path }) => {
                Some(format!("Removed sandbox {}", path.display()))
            }
            AppEvent::Install(InstallEvent::Started {
                component,
                packages,
                ..
            }) => Some(format!(
                "Installing {} for {component}",
                packages.join(", ")
            )),
            AppEvent::Install(InstallEvent::Completed { component, .. }) => {
                Some(format!("Installed packages for {component}"))
            }
            AppEvent::Install(InstallEvent::Failed {
                component, failure, ..
            }) => Some(format!(
                "Package install failed for {component}: {}",
                failure.message
            )),
            AppEvent::Install(InstallEvent::Output { line, .. }) => Some(format!("  {line}")),
            AppEvent::General(GeneralEvent::Warning { message, .. }) => {
                Some(format!("Warning: {message}"))
            }
            AppEvent::General(GeneralEvent::DebugLog { message, .. }) if self.debug_enabled => {
                Some(format!("[debug] {message}"))
            }
            _ => None,
        }
    }
}
