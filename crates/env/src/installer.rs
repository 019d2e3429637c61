//! Concurrent third-party package installation

use capsule_errors::{Error, InstallError};
use capsule_events::{AppEvent, EventEmitter, EventSender, FailureContext, InstallEvent};
use capsule_npm::PackageManagerClient;
use capsule_types::{ComponentId, PackageDependencies, ResolvedComponent};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of installing one component's packages
#[derive(Debug)]
pub struct InstallOutcome {
    pub component: ComponentId,
    pub cwd: PathBuf,
    pub result: Result<(), Error>,
}

impl InstallOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// One package-manager invocation
struct InstallJob {
    index: usize,
    component: ComponentId,
    cwd: PathBuf,
    dependencies: PackageDependencies,
}

/// Runs one package-manager invocation per component, all concurrently
///
/// Components without third-party packages are skipped. Every invocation is
/// allowed to settle before a result is reported, so nothing keeps writing
/// into the sandbox once the installer returns.
#[derive(Clone)]
pub struct DependencyInstaller {
    client: Arc<dyn PackageManagerClient>,
    event_sender: Option<EventSender>,
}

impl std::fmt::Debug for DependencyInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyInstaller")
            .field("event_sender", &self.event_sender.is_some())
            .finish_non_exhaustive()
    }
}

impl DependencyInstaller {
    #[must_use]
    pub fn new(client: Arc<dyn PackageManagerClient>) -> Self {
        Self {
            client,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Install every component's packages, failing if any invocation fails
    ///
    /// Every launched invocation has settled by the time this returns, also
    /// when one of them failed early. The error of the first invocation to
    /// fail is returned; which of the others succeeded is not reported.
    ///
    /// # Errors
    ///
    /// Returns an `InstallError` if a component with packages was never
    /// written, if any invocation fails, or if an install task panics.
    pub async fn install(&self, components: &[ResolvedComponent], verbose: bool) -> Result<(), Error> {
        let settled = self.run(components, verbose).await?;
        match settled.into_iter().find_map(|(_, outcome)| outcome.result.err()) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Install every component's packages and report each outcome
    ///
    /// Outcomes follow the order of `components`; skipped components have
    /// no entry.
    ///
    /// # Errors
    ///
    /// Returns an `InstallError` if a component with packages was never
    /// written or if an install task panics.
    pub async fn install_each(
        &self,
        components: &[ResolvedComponent],
        verbose: bool,
    ) -> Result<Vec<InstallOutcome>, Error> {
        let mut settled = self.run(components, verbose).await?;
        settled.sort_by_key(|(index, _)| *index);
        Ok(settled.into_iter().map(|(_, outcome)| outcome).collect())
    }

    fn jobs(&self, components: &[ResolvedComponent]) -> Result<Vec<InstallJob>, Error> {
        let mut jobs = Vec::new();
        for (index, component) in components.iter().enumerate() {
            if !component.has_package_dependencies() {
                self.emit(AppEvent::Install(InstallEvent::Skipped {
                    component: component.id.to_string(),
                }));
                continue;
            }
            let cwd = component
                .written_path()
                .ok_or_else(|| InstallError::MissingWrittenPath {
                    component: component.id.to_string(),
                })?
                .to_path_buf();
            jobs.push(InstallJob {
                index,
                component: component.id.clone(),
                cwd,
                dependencies: component.package_dependencies.clone(),
            });
        }
        Ok(jobs)
    }

    /// Launch all jobs and collect outcomes in completion order
    async fn run(
        &self,
        components: &[ResolvedComponent],
        verbose: bool,
    ) -> Result<Vec<(usize, InstallOutcome)>, Error> {
        let jobs = self.jobs(components)?;
        tracing::debug!(invocations = jobs.len(), verbose, "installing packages");

        let mut tasks = JoinSet::new();
        for job in jobs {
            let client = Arc::clone(&self.client);
            let events = self.event_sender.clone();

            tasks.spawn(async move {
                tracing::debug!(component = %job.component, cwd = %job.cwd.display(), "launching package install");
                events.emit(AppEvent::Install(InstallEvent::Started {
                    component: job.component.to_string(),
                    cwd: job.cwd.clone(),
                    packages: job.dependencies.keys().cloned().collect(),
                }));

                let result = client
                    .install(&job.dependencies, &job.cwd, verbose)
                    .await
                    .map_err(Error::into_install);

                match &result {
                    Ok(()) => events.emit(AppEvent::Install(InstallEvent::Completed {
                        component: job.component.to_string(),
                        cwd: job.cwd.clone(),
                    })),
                    Err(e) => {
                        tracing::warn!(component = %job.component, error = %e, "package install failed");
                        events.emit(AppEvent::Install(InstallEvent::Failed {
                            component: job.component.to_string(),
                            cwd: job.cwd.clone(),
                            failure: FailureContext::from_error(e),
                        }));
                    }
                }

                (
                    job.index,
                    InstallOutcome {
                        component: job.component,
                        cwd: job.cwd,
                        result,
                    },
                )
            });
        }

        let mut settled = Vec::new();
        let mut panicked = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => settled.push(outcome),
                Err(e) => {
                    panicked.get_or_insert(InstallError::TaskError {
                        message: format!("task join error: {e}"),
                    });
                }
            }
        }

        match panicked {
            Some(error) => Err(error.into()),
            None => Ok(settled),
        }
    }
}

impl EventEmitter for DependencyInstaller {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
