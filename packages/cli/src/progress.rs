//! Progress bar utilities for the CLI.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress bar manager for replays.
pub struct ProgressManager {
    multi: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    /// Create a new progress manager.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            enabled,
        }
    }

    /// Whether bars are drawn.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create a progress bar over catalogue entries.
    ///
    /// If progress is disabled, returns a hidden progress bar.
    #[must_use]
    pub fn create_entry_bar(&self, total: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new(total));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix:<10} [{bar:25.green/dim}] {pos}/{len} entries {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("━━─"),
        );
        pb.set_prefix("Copying");
        pb
    }

    /// Create a spinner for the catalogue build, whose size is unknown.
    #[must_use]
    pub fn create_scanning_spinner(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner} Scanning {msg}")
                .expect("Invalid progress bar template"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        pb
    }

    /// Clear any active progress bars (for clean output after completion).
    pub fn clear(&self) {
        self.multi.clear().ok();
    }
}
