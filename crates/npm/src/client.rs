//! npm-compatible process client

use crate::PackageManagerClient;
use capsule_errors::{Error, InstallError};
use capsule_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use capsule_types::PackageDependencies;
use std::path::Path;
use tokio::process::Command;

/// Runs `<program> install <name>@<range>... <extra args>` in the target directory
#[derive(Debug, Clone)]
pub struct NpmClient {
    program: String,
    extra_args: Vec<String>,
    event_sender: Option<EventSender>,
}

impl Default for NpmClient {
    fn default() -> Self {
        Self::new("npm")
    }
}

impl NpmClient {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program for `dependencies`
    #[must_use]
    pub fn install_args(&self, dependencies: &PackageDependencies) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        args.extend(
            dependencies
                .iter()
                .map(|(name, range)| format!("{name}@{range}")),
        );
        args.extend(self.extra_args.iter().cloned());
        args
    }

    fn relay(&self, cwd: &Path, stream: &[u8]) {
        let component = cwd.display().to_string();
        for line in String::from_utf8_lossy(stream).lines() {
            tracing::info!(cwd = %component, "{line}");
            self.emit(AppEvent::Install(InstallEvent::Output {
                component: component.clone(),
                line: line.to_string(),
            }));
        }
    }
}

impl EventEmitter for NpmClient {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

#[async_trait::async_trait]
impl PackageManagerClient for NpmClient {
    async fn install(
        &self,
        dependencies: &PackageDependencies,
        cwd: &Path,
        verbose: bool,
    ) -> Result<(), Error> {
        if dependencies.is_empty() {
            return Ok(());
        }

        let args = self.install_args(dependencies);
        let command = format!("{} {}", self.program, args.join(" "));
        tracing::debug!(cwd = %cwd.display(), %command, "running package manager");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(cwd)
            .output()
            .await
            .map_err(|e| InstallError::SpawnFailed {
                program: self.program.clone(),
                message: e.to_string(),
            })?;

        if verbose {
            self.relay(cwd, &output.stdout);
            self.relay(cwd, &output.stderr);
        }

        if !output.status.success() {
            return Err(InstallError::CommandFailed {
                command,
                cwd: cwd.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args() {
        let client = NpmClient::new("npm").with_extra_args(vec!["--no-save".to_string()]);
        let mut deps = PackageDependencies::new();
        deps.insert("lodash".to_string(), "^4.0.0".to_string());
        deps.insert("left-pad".to_string(), "1.3.0".to_string());

        assert_eq!(
            client.install_args(&deps),
            vec!["install", "left-pad@1.3.0", "lodash@^4.0.0", "--no-save"]
        );
    }
}
