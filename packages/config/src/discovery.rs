//! Configuration file discovery.
//!
//! Looks, in order, at an explicit path, `$RAWCOPY_CONFIG`, then
//! `<config dir>/rawcopy/config.toml`.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV_VAR: &str = "RAWCOPY_CONFIG";

/// Find the configuration file to use.
///
/// Returns `None` when no file applies and defaults should be used.
///
/// # Arguments
///
/// * `explicit` - Path given on the command line, must exist
///
/// # Errors
///
/// * If an explicit or environment-provided file does not exist
pub fn discover_config(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    discover_config_in(
        explicit,
        std::env::var_os(CONFIG_ENV_VAR),
        dirs::config_dir(),
    )
}

fn discover_config_in(
    explicit: Option<&Path>,
    env_path: Option<OsString>,
    config_dir: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        log::debug!("Using config from command line: {}", path.display());
        return require_file(path.to_path_buf()).map(Some);
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        log::debug!("Using config from ${CONFIG_ENV_VAR}");
        return require_file(PathBuf::from(path)).map(Some);
    }

    let default = config_dir.map(|dir| default_config_path(&dir));
    match default {
        Some(path) if path.is_file() => {
            log::debug!("Using default config {}", path.display());
            Ok(Some(path))
        }
        _ => {
            log::debug!("No config file found, using defaults");
            Ok(None)
        }
    }
}

/// Location of the per-user configuration file under `config_dir`.
#[must_use]
pub fn default_config_path(config_dir: &Path) -> PathBuf {
    config_dir.join("rawcopy").join("config.toml")
}

fn require_file(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::NotFound(path))
    }
}
