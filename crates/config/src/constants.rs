//! Default names used when a path is not configured explicitly

/// Directory, relative to the scope path, holding isolated environments
pub const ENVIRONMENTS_DIR: &str = "environment";

/// Config file name under the user config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Application directory name under the user config directory
pub const APP_DIR: &str = "capsule";

/// Default package-manager executable
pub const DEFAULT_INSTALL_PROGRAM: &str = "npm";
