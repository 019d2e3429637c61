//! capsule - isolated sandboxes for repository components
//!
//! Thin CLI over the environment crate: loads configuration, wires the
//! repository, writer and package manager together, and renders events and
//! results.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, IsolateArgs};
use crate::display::{IsolateReport, OperationResult, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use capsule_config::Config;
use capsule_env::{Environment, SandboxPathAllocator};
use capsule_errors::SandboxError;
use capsule_events::{EventReceiver, EventSender};
use capsule_npm::NpmClient;
use capsule_scope::LocalScope;
use capsule_writer::FsWriter;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if json_mode {
            match serde_json::to_string_pretty(&e.report()) {
                Ok(json) => println!("{json}"),
                Err(render) => eprintln!("Error: {e} ({render})"),
            }
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting capsule v{}", env!("CARGO_PKG_VERSION"));

    // file config (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let (event_sender, event_receiver) = capsule_events::channel();
    let renderer = OutputRenderer::new(cli.global.json);
    let mut event_handler = EventHandler::new(cli.global.json, cli.global.debug);

    let result = execute_command_with_events(
        cli.command,
        config,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(&event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(&event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    config: Config,
    events: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Isolate(args) => isolate(&args, &config, events).await,
        Commands::Destroy { path } => {
            let path = destroy(&path, &config, events).await?;
            Ok(OperationResult::Destroyed { path })
        }
        Commands::Config => Ok(OperationResult::Config {
            toml: config.to_toml()?,
        }),
    }
}

async fn isolate(
    args: &IsolateArgs,
    config: &Config,
    events: EventSender,
) -> Result<OperationResult, CliError> {
    let scope_path = config.scope_path();
    let repository = Arc::new(LocalScope::new(&scope_path));
    let environment = match &args.dir {
        Some(dir) => Environment::at(repository, dir),
        None => Environment::new(repository, &allocator(config)?),
    };

    let client = NpmClient::new(config.install.program.as_str())
        .with_extra_args(config.install.extra_args.clone())
        .with_event_sender(events.clone());
    let mut environment = environment
        .with_writer(Arc::new(FsWriter::new().with_event_sender(events.clone())))
        .with_client(Arc::new(client))
        .with_compiler(config.compiler.capability())
        .with_source_scope(scope_path)
        .with_event_sender(events);

    environment.create().await?;

    let options = args.options(config.install.verbose);
    let isolated = environment.isolate(args.id.as_str(), &options).await;

    let graph = if args.destroy {
        let destroyed = environment.destroy().await;
        let graph = isolated?;
        destroyed?;
        graph
    } else {
        isolated.map_err(|source| {
            warn!(
                sandbox = %environment.path().display(),
                "isolation failed, sandbox left in place"
            );
            CliError::SandboxKept {
                sandbox: environment.path().to_path_buf(),
                source,
            }
        })?
    };

    Ok(OperationResult::Isolated(IsolateReport {
        component: graph.id().to_string(),
        sandbox: environment.path().to_path_buf(),
        written_path: graph.component.written_path.clone(),
        dependencies: graph
            .dependencies
            .iter()
            .map(|dependency| dependency.id.to_string())
            .collect(),
        packages_installed: options.install_packages,
        destroyed: args.destroy,
    }))
}

async fn destroy(path: &Path, config: &Config, events: EventSender) -> Result<PathBuf, CliError> {
    let allocator = allocator(config)?;
    let path = std::path::absolute(path)?;
    if !allocator.owns(&path) {
        return Err(capsule_errors::Error::from(SandboxError::OutsideRoot {
            path: path.display().to_string(),
            root: allocator.root().display().to_string(),
        })
        .into());
    }

    let mut environment =
        Environment::at(Arc::new(LocalScope::new(config.scope_path())), &path)
            .with_event_sender(events);
    environment.destroy().await?;
    Ok(path)
}

/// Allocator rooted at the absolute environments directory
fn allocator(config: &Config) -> Result<SandboxPathAllocator, CliError> {
    Ok(SandboxPathAllocator::new(std::path::absolute(
        config.environments_dir(),
    )?))
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(scope) = &global.scope {
        config.paths.scope_path = Some(scope.clone());
    }
}

/// Initialize tracing/logging
///
/// Logs go to stderr so stdout only ever carries the command result.
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let default_filter = if debug_enabled {
        "info,capsule=debug,capsule_env=debug,capsule_writer=debug,capsule_npm=debug"
    } else {
        "warn"
    };
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter))
    };

    if json_mode && !debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(debug_enabled)
            .with_env_filter(filter())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsule_errors::Error;
    use capsule_scope::ComponentRepository;
    use capsule_types::ResolvedComponent;
    use tempfile::tempdir;

    fn config_for(scope: &Path) -> Config {
        let mut config = Config::default();
        config.paths.scope_path = Some(scope.to_path_buf());
        config
    }

    fn isolate_args(id: &str) -> IsolateArgs {
        let cli = Cli::parse_from(["capsule", "isolate", id]);
        match cli.command {
            Commands::Isolate(args) => args,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_destroy_refuses_paths_outside_root() {
        let temp = tempdir().unwrap();
        let config = config_for(temp.path());
        let (tx, _rx) = capsule_events::channel();

        let outside = temp.path().join("not-an-environment");
        std::fs::create_dir_all(&outside).unwrap();
        let err = destroy(&outside, &config, tx).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::Capsule(Error::Sandbox(SandboxError::OutsideRoot { .. }))
        ));
        assert!(outside.is_dir());
    }

    #[tokio::test]
    async fn test_failed_isolate_reports_kept_sandbox() {
        let temp = tempdir().unwrap();
        let config = config_for(temp.path());
        let (tx, _rx) = capsule_events::channel();

        let err = isolate(&isolate_args("org/missing"), &config, tx.clone())
            .await
            .unwrap_err();
        let CliError::SandboxKept { sandbox, source } = &err else {
            panic!("expected kept sandbox, got {err:?}");
        };
        assert!(matches!(source, Error::Resolution(_)));
        assert!(sandbox.is_dir());
        assert_eq!(err.report().sandbox, Some(sandbox.as_path()));

        let destroy_args = Cli::parse_from(["capsule", "isolate", "--destroy", "org/missing"]);
        let Commands::Isolate(args) = destroy_args.command else {
            unreachable!();
        };
        let err = isolate(&args, &config, tx).await.unwrap_err();
        assert!(matches!(err, CliError::Capsule(Error::Resolution(_))));
        assert!(err.sandbox().is_none());
    }

    #[tokio::test]
    async fn test_isolate_then_destroy_command() {
        let temp = tempdir().unwrap();
        let scope = LocalScope::new(temp.path());
        scope
            .put(
                &ResolvedComponent::new("org/button@1.0.0".parse().unwrap())
                    .with_file("index.js", "module.exports = 1;"),
            )
            .await
            .unwrap();
        assert!(scope.get(&"org/button".parse().unwrap()).await.is_ok());

        let config = config_for(temp.path());
        let (tx, _rx) = capsule_events::channel();
        let result = isolate(&isolate_args("org/button"), &config, tx.clone())
            .await
            .unwrap();
        let OperationResult::Isolated(report) = result else {
            panic!("expected isolate report");
        };
        assert_eq!(report.component, "org/button@1.0.0");
        assert!(report.sandbox.join("index.js").is_file());
        assert!(report.sandbox.starts_with(temp.path().join("environment")));

        destroy(&report.sandbox, &config, tx).await.unwrap();
        assert!(!report.sandbox.exists());
    }
}
