//! Progress reporting for replays.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Progress information sent after each processed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayProgress {
    /// Index of the entry just processed.
    pub index: u64,
    /// Number of in-range entries processed so far in this run.
    pub entries_processed: u64,
}

impl ReplayProgress {
    /// Create a new progress report.
    #[must_use]
    pub const fn new(index: u64, entries_processed: u64) -> Self {
        Self {
            index,
            entries_processed,
        }
    }

    /// Calculate progress as a percentage (0.0 to 100.0) of `total` entries.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self, total: u64) -> f64 {
        if total == 0 {
            100.0
        } else {
            ((self.index + 1) as f64 / total as f64).min(1.0) * 100.0
        }
    }
}
