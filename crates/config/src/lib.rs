#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for capsule
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/capsule/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;

use capsule_errors::{ConfigError, Error};
use capsule_types::{CompilerCapability, CompilerDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Root of the component repository
    pub scope_path: Option<PathBuf>,
    /// Where isolated environments are allocated
    pub environments_dir: Option<PathBuf>,
}

/// Package-manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
    #[serde(default)]
    pub verbose: bool,
}

/// Compiler the environments are configured with, if any
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompilerConfig {
    pub id: Option<String>,
    pub version: Option<String>,
    pub display_name: Option<String>,
    pub config: Option<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extra_args: Vec::new(),
            verbose: false,
        }
    }
}

fn default_program() -> String {
    constants::DEFAULT_INSTALL_PROGRAM.to_string()
}

impl CompilerConfig {
    /// Resolve the configured compiler into a capability
    #[must_use]
    pub fn capability(&self) -> CompilerCapability {
        CompilerCapability::from_descriptor(self.id.as_ref().map(|id| CompilerDescriptor {
            id: id.clone(),
            version: self.version.clone(),
            display_name: self.display_name.clone(),
            config: self.config.clone(),
        }))
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join(constants::APP_DIR).join(constants::CONFIG_FILE))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        let exists = fs::try_exists(&config_path)
            .await
            .map_err(|e| Error::io_with_path(&e, &config_path))?;
        if exists {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // CAPSULE_SCOPE_PATH
        if let Ok(path) = std::env::var("CAPSULE_SCOPE_PATH") {
            self.paths.scope_path = Some(PathBuf::from(path));
        }

        // CAPSULE_ENVIRONMENTS_DIR
        if let Ok(path) = std::env::var("CAPSULE_ENVIRONMENTS_DIR") {
            self.paths.environments_dir = Some(PathBuf::from(path));
        }

        // CAPSULE_NPM_PROGRAM
        if let Ok(program) = std::env::var("CAPSULE_NPM_PROGRAM") {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "CAPSULE_NPM_PROGRAM".to_string(),
                    value: program,
                }
                .into());
            }
            self.install.program = program;
        }

        // CAPSULE_VERBOSE
        if let Ok(verbose) = std::env::var("CAPSULE_VERBOSE") {
            self.install.verbose = match verbose.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "CAPSULE_VERBOSE".to_string(),
                        value: verbose,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Get the scope path (with default)
    #[must_use]
    pub fn scope_path(&self) -> PathBuf {
        self.paths
            .scope_path
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Get the environments directory (with default under the scope path)
    #[must_use]
    pub fn environments_dir(&self) -> PathBuf {
        self.paths
            .environments_dir
            .clone()
            .unwrap_or_else(|| self.scope_path().join(constants::ENVIRONMENTS_DIR))
    }

    /// Render the effective configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError {
                error: e.to_string(),
            })
            .map_err(Into::into)
    }
}
