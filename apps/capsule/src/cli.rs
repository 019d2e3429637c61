//! Command line interface definition

use capsule_types::IsolationOptions;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// capsule - isolated sandboxes for repository components
#[derive(Parser)]
#[command(name = "capsule")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Isolate components and their dependencies into disposable sandboxes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Component repository to isolate from
    #[arg(long, global = true, value_name = "PATH", env = "CAPSULE_SCOPE_PATH")]
    pub scope: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Isolate a component and its dependencies into a new sandbox
    Isolate(IsolateArgs),

    /// Remove a sandbox created by `isolate`
    Destroy {
        /// Sandbox directory
        path: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct IsolateArgs {
    /// Component id, e.g. org.widgets/button@1.2.0
    pub id: String,

    /// Sandbox directory to use instead of a freshly allocated one
    #[arg(long, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Write the component somewhere other than the sandbox root
    #[arg(long, value_name = "PATH")]
    pub write_to: Option<PathBuf>,

    /// Overwrite files that already exist
    #[arg(long = "override")]
    pub override_existing: bool,

    /// Do not generate package.json files
    #[arg(long)]
    pub no_package_json: bool,

    /// Write each component's tool configuration
    #[arg(long)]
    pub conf: bool,

    /// Write repository records so the sandbox can serve as a scope
    #[arg(long, alias = "write-bit-dependencies")]
    pub write_internal_dependencies: bool,

    /// Generate link shims for local dependencies
    #[arg(long)]
    pub npm_links: bool,

    /// Also write build output
    #[arg(long)]
    pub dist: bool,

    /// Install third-party packages after writing
    #[arg(long)]
    pub install: bool,

    /// Show package manager output
    #[arg(long)]
    pub verbose: bool,

    /// Remove the sandbox again once isolation has finished
    #[arg(long)]
    pub destroy: bool,
}

impl IsolateArgs {
    /// Options for `Environment::isolate`; `verbose` also honours the config
    pub fn options(&self, verbose_default: bool) -> IsolationOptions {
        IsolationOptions {
            write_to_path: self.write_to.clone(),
            override_existing: self.override_existing,
            no_package_json: self.no_package_json,
            conf: self.conf,
            write_internal_dependencies: self.write_internal_dependencies,
            create_link_files: self.npm_links,
            dist: self.dist,
            install_packages: self.install,
            verbose: self.verbose || verbose_default,
        }
    }
}
