//! Sandbox lifecycle and component isolation

use crate::{DependencyInstaller, SandboxPathAllocator};
use capsule_errors::{Error, ResolutionError, SandboxError};
use capsule_events::{AppEvent, EnvironmentEvent, EventEmitter, EventSender};
use capsule_npm::{NpmClient, PackageManagerClient};
use capsule_scope::ComponentRepository;
use capsule_types::{CompilerCapability, ComponentId, ComponentWithDependencies, IsolationOptions};
use capsule_writer::{ComponentWriter, FsWriter, Workspace};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::fs;

/// Directory under the sandbox holding primaries isolated after the first
pub const COMPONENTS_DIR: &str = ".components";

/// Where an environment is in its lifecycle
#[derive(Debug, Clone, Default)]
pub enum EnvironmentState {
    #[default]
    Uninitialized,
    /// Directory exists and a workspace session is open on it
    Ready(Workspace),
    Destroyed,
}

impl EnvironmentState {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

impl fmt::Display for EnvironmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready(_) => "ready",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// Anything `isolate` accepts as a component reference
pub trait IntoComponentId {
    /// # Errors
    ///
    /// Returns an `IdentifierError` if the reference is not a valid id.
    fn into_component_id(self) -> Result<ComponentId, Error>;
}

impl IntoComponentId for ComponentId {
    fn into_component_id(self) -> Result<ComponentId, Error> {
        Ok(self)
    }
}

impl IntoComponentId for &ComponentId {
    fn into_component_id(self) -> Result<ComponentId, Error> {
        Ok(self.clone())
    }
}

impl IntoComponentId for &str {
    fn into_component_id(self) -> Result<ComponentId, Error> {
        Ok(ComponentId::parse(self)?)
    }
}

impl IntoComponentId for String {
    fn into_component_id(self) -> Result<ComponentId, Error> {
        self.as_str().into_component_id()
    }
}

impl IntoComponentId for &String {
    fn into_component_id(self) -> Result<ComponentId, Error> {
        self.as_str().into_component_id()
    }
}

/// A disposable sandbox directory components are isolated into
///
/// The sandbox path is fixed at construction. `create` provisions it,
/// `isolate` fills it and `destroy` removes it; several `isolate` calls may
/// run at once against the same ready environment.
///
/// Without an explicit `write_to_path`, the first component isolated owns the
/// sandbox root. Any other component gets its own subtree at
/// `<sandbox>/.components/<scope>/<name>/<version>`.
pub struct Environment {
    path: PathBuf,
    repository: Arc<dyn ComponentRepository>,
    source_scope: Option<PathBuf>,
    writer: Arc<dyn ComponentWriter>,
    installer: DependencyInstaller,
    compiler: CompilerCapability,
    state: EnvironmentState,
    root_owner: Mutex<Option<ComponentId>>,
    event_sender: Option<EventSender>,
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("path", &self.path)
            .field("source_scope", &self.source_scope)
            .field("compiler", &self.compiler)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Environment {
    /// Environment at a freshly allocated sandbox path
    #[must_use]
    pub fn new(repository: Arc<dyn ComponentRepository>, allocator: &SandboxPathAllocator) -> Self {
        Self::at(repository, allocator.allocate())
    }

    /// Environment at an explicit sandbox directory
    #[must_use]
    pub fn at(repository: Arc<dyn ComponentRepository>, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            repository,
            source_scope: None,
            writer: Arc::new(FsWriter::new()),
            installer: DependencyInstaller::new(Arc::new(NpmClient::default())),
            compiler: CompilerCapability::NoCompiler,
            state: EnvironmentState::Uninitialized,
            root_owner: Mutex::new(None),
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_writer(mut self, writer: Arc<dyn ComponentWriter>) -> Self {
        self.writer = writer;
        self
    }

    /// Package-manager client used when `install_packages` is requested
    #[must_use]
    pub fn with_client(mut self, client: Arc<dyn PackageManagerClient>) -> Self {
        let installer = DependencyInstaller::new(client);
        self.installer = match &self.event_sender {
            Some(sender) => installer.with_event_sender(sender.clone()),
            None => installer,
        };
        self
    }

    #[must_use]
    pub fn with_compiler(mut self, compiler: CompilerCapability) -> Self {
        self.compiler = compiler;
        self
    }

    /// Repository location recorded in the workspace session
    #[must_use]
    pub fn with_source_scope(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_scope = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.installer = self.installer.with_event_sender(sender.clone());
        self.event_sender = Some(sender);
        self
    }

    /// Sandbox directory, whether or not it currently exists
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn compiler(&self) -> &CompilerCapability {
        &self.compiler
    }

    #[must_use]
    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }

    /// Provision the sandbox directory and open a workspace on it
    ///
    /// Creating an existing directory is not an error, and an environment
    /// may be created again after being destroyed.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::CreateFailed` if the directory or the workspace
    /// session cannot be created.
    pub async fn create(&mut self) -> Result<(), Error> {
        tracing::debug!(path = %self.path.display(), "creating environment");

        fs::create_dir_all(&self.path)
            .await
            .map_err(|e| self.create_failed(&e))?;
        let workspace = Workspace::open(&self.path, self.source_scope.as_deref())
            .await
            .map_err(|e| self.create_failed(&e))?;

        self.state = EnvironmentState::Ready(workspace);
        self.release_root(None);
        self.emit(AppEvent::Environment(EnvironmentEvent::Created {
            path: self.path.clone(),
        }));
        Ok(())
    }

    /// Pull a component and its dependencies into the sandbox
    ///
    /// Resolves `id` with its transitive dependencies, writes them as
    /// `options` direct and, when `install_packages` is set, installs every
    /// written component's third-party packages. Returns the primary graph
    /// with written locations filled in.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::InvalidState` unless the environment is ready,
    /// an `IdentifierError` for an unparseable id, a `ResolutionError` when
    /// the component or one of its dependencies cannot be found, a
    /// `MaterializationError` when writing fails and an `InstallError` when
    /// any package install fails.
    pub async fn isolate(
        &self,
        id: impl IntoComponentId,
        options: &IsolationOptions,
    ) -> Result<ComponentWithDependencies, Error> {
        let EnvironmentState::Ready(workspace) = &self.state else {
            return Err(self.invalid_state("isolate"));
        };
        let id = id.into_component_id()?;

        if options.write_to_path.is_some() {
            return self.isolate_into(workspace, &id, &self.path, options).await;
        }
        let (destination, claimed) = self.default_destination(&id);
        let result = self.isolate_into(workspace, &id, &destination, options).await;
        if claimed && result.is_err() {
            self.release_root(Some(&id));
        }
        result
    }

    async fn isolate_into(
        &self,
        workspace: &Workspace,
        id: &ComponentId,
        destination: &Path,
        options: &IsolationOptions,
    ) -> Result<ComponentWithDependencies, Error> {
        let directives = options.directives(destination, &self.compiler);

        tracing::debug!(
            component = %id,
            destination = %directives.write_to_path.display(),
            install_packages = options.install_packages,
            "isolating component"
        );
        self.emit(AppEvent::Environment(EnvironmentEvent::Isolating {
            component: id.to_string(),
            destination: directives.write_to_path.clone(),
            install_packages: options.install_packages,
        }));

        let resolved = self
            .repository
            .resolve(std::slice::from_ref(id))
            .await
            .map_err(Error::into_resolution)?;
        if resolved.is_empty() {
            return Err(ResolutionError::NotFound { id: id.to_string() }.into());
        }

        let written = self
            .writer
            .write(workspace, resolved, &directives)
            .await
            .map_err(Error::into_materialization)?;
        let graph = written
            .into_iter()
            .next()
            .ok_or_else(|| Error::internal(format!("writer returned no graph for {id}")))?;

        self.emit(AppEvent::Environment(EnvironmentEvent::Isolated {
            component: graph.id().to_string(),
            destination: directives.write_to_path.clone(),
            dependency_count: graph.dependencies.len(),
        }));

        if options.install_packages {
            self.installer
                .install(&graph.flatten(), options.verbose)
                .await?;
        }

        Ok(graph)
    }

    /// Remove the sandbox directory and everything in it
    ///
    /// Destroying a directory that is already gone succeeds. On failure the
    /// environment keeps its state so the call can be retried.
    ///
    /// # Errors
    ///
    /// Returns `SandboxError::RemoveFailed` if the directory cannot be removed.
    pub async fn destroy(&mut self) -> Result<(), Error> {
        tracing::debug!(path = %self.path.display(), state = %self.state, "destroying environment");

        match fs::remove_dir_all(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "sandbox already removed");
            }
            Err(e) => {
                return Err(SandboxError::RemoveFailed {
                    path: self.path.display().to_string(),
                    message: e.to_string(),
                }
                .into());
            }
        }

        self.state = EnvironmentState::Destroyed;
        self.release_root(None);
        self.emit(AppEvent::Environment(EnvironmentEvent::Destroyed {
            path: self.path.clone(),
        }));
        Ok(())
    }

    /// Where a component goes when the caller names no destination
    ///
    /// The boolean is true when this call claimed the sandbox root.
    fn default_destination(&self, id: &ComponentId) -> (PathBuf, bool) {
        let mut owner = self.root_owner.lock().unwrap_or_else(PoisonError::into_inner);
        match owner.as_ref() {
            None => {
                *owner = Some(id.clone());
                (self.path.clone(), true)
            }
            Some(existing) if existing.same_component(id) => (self.path.clone(), false),
            Some(_) => {
                let [scope, name, version] = id.path_segments();
                let subtree = self
                    .path
                    .join(COMPONENTS_DIR)
                    .join(scope)
                    .join(name)
                    .join(version);
                (subtree, false)
            }
        }
    }

    /// Free the sandbox root, only if `id` still owns it when given
    fn release_root(&self, id: Option<&ComponentId>) {
        let mut owner = self.root_owner.lock().unwrap_or_else(PoisonError::into_inner);
        if id.is_none_or(|id| owner.as_ref() == Some(id)) {
            *owner = None;
        }
    }

    fn create_failed(&self, error: &dyn fmt::Display) -> Error {
        SandboxError::CreateFailed {
            path: self.path.display().to_string(),
            message: error.to_string(),
        }
        .into()
    }

    fn invalid_state(&self, operation: &str) -> Error {
        SandboxError::InvalidState {
            operation: operation.to_string(),
            state: self.state.to_string(),
        }
        .into()
    }
}

impl EventEmitter for Environment {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
