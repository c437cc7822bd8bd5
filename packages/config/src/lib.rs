//! Configuration loading for rawcopy.
//!
//! Settings come from an optional TOML file; every key is optional.
//!
//! # Example
//!
//! ```rust,ignore
//! use rawcopy_config::load_config;
//!
//! let loaded = load_config(None)?;
//! println!("checkpoint every {} entries", loaded.config.checkpoint_interval);
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod discovery;
mod error;
mod toml_loader;
mod types;

pub use discovery::{CONFIG_ENV_VAR, default_config_path, discover_config};
pub use error::ConfigError;
pub use toml_loader::load_toml_config;
pub use types::{Config, KindMismatch, LoadedConfig};

use std::path::Path;

/// Discover and load the configuration, falling back to defaults.
///
/// # Arguments
///
/// * `explicit` - Path given on the command line, if any
///
/// # Errors
///
/// * If an explicitly requested file does not exist
/// * If the file cannot be read or parsed
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let Some(path) = discover_config(explicit)? else {
        return Ok(LoadedConfig::default());
    };

    let config = load_toml_config(&path)?;
    Ok(LoadedConfig {
        config,
        config_path: Some(path),
    })
}
