//! Replay options.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use crate::attrs::AttributeOptions;
use crate::range::ReplayRange;

/// Entries between two registry flushes (and checkpoints).
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1000;

/// What to do when a record's declared kind disagrees with the source's
/// on-disk type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KindMismatchPolicy {
    /// Log a warning and copy according to the on-disk type.
    #[default]
    Warn,
    /// Abort the replay.
    Strict,
}

/// Options controlling a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    /// Restrict processing to these indices. `None` enables checkpoint resume.
    pub range: Option<ReplayRange>,
    /// Log what would be done without touching the filesystem or registry.
    pub test_mode: bool,
    /// Handling of declared kind vs on-disk type disagreements.
    pub kind_mismatch: KindMismatchPolicy,
    /// Flush the registry every time the entry index is a multiple of this.
    pub checkpoint_interval: u64,
    /// Try a copy-on-write clone before a plain copy.
    pub reflink: bool,
    /// Attribute selection.
    pub attributes: AttributeOptions,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            range: None,
            test_mode: false,
            kind_mismatch: KindMismatchPolicy::default(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            reflink: true,
            attributes: AttributeOptions::default(),
        }
    }
}

impl ReplayOptions {
    /// Whether processing `index` should be followed by a sync.
    #[must_use]
    pub const fn is_checkpoint(&self, index: u64) -> bool {
        self.checkpoint_interval != 0 && index != 0 && index % self.checkpoint_interval == 0
    }
}
