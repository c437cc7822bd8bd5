//! Configuration types for rawcopy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Reaction to a catalogue record whose kind no longer matches the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindMismatch {
    /// Warn and copy what is on disk.
    #[default]
    Warn,
    /// Abort the replay.
    Strict,
}

const fn default_checkpoint_interval() -> u64 {
    1000
}

const fn default_true() -> bool {
    true
}

/// rawcopy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Kind mismatch handling.
    #[serde(default)]
    pub kind_mismatch: KindMismatch,

    /// Catalogue entries between registry flushes and checkpoints.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: u64,

    /// Try copy-on-write clones before plain copies.
    #[serde(default = "default_true")]
    pub reflink: bool,

    /// Copy owner and group.
    #[serde(default = "default_true")]
    pub preserve_ownership: bool,

    /// Show a progress bar.
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind_mismatch: KindMismatch::default(),
            checkpoint_interval: default_checkpoint_interval(),
            reflink: true,
            preserve_ownership: true,
            progress: true,
        }
    }
}

/// A loaded configuration with metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// The parsed configuration.
    pub config: Config,
    /// File it was read from, `None` when built-in defaults are used.
    pub config_path: Option<PathBuf>,
}
