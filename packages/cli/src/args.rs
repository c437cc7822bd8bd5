//! CLI argument definitions.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use rawcopy_copy::ReplayRange;

/// CLI arguments for rawcopy.
#[derive(Debug, Parser)]
#[command(
    name = "rawcopy",
    about = "Copy directory trees through a catalogue, preserving hard links",
    version
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Source files or directories to catalogue.
    #[arg(index = 1)]
    pub sources: Vec<PathBuf>,

    /// Catalogue to use, built from the sources if it does not exist.
    /// Defaults to OUTPUT/__rawcopy__/catalogue.lst.
    #[arg(long, short = 'c')]
    pub catalogue: Option<PathBuf>,

    /// Destination directory.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Catalogue index range to copy: A-B, A-, -B or A.
    #[arg(long, short = 'r')]
    pub range: Option<ReplayRange>,

    /// Test run: log what would be done without changing anything.
    #[arg(long = "test", short = 't')]
    pub test: bool,

    /// Only build the catalogue.
    #[arg(long = "catalogue-only", short = 'C')]
    pub catalogue_only: bool,

    /// Abort when a catalogued entry changed type on disk.
    #[arg(long)]
    pub strict: bool,

    /// Configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Disable progress bars (useful for CI environments).
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(long, short = 'v', action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Log filter implied by `--verbose`.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Determine if we should show progress bars.
    #[must_use]
    pub const fn should_show_progress(&self, configured: bool) -> bool {
        configured && !self.no_progress
    }

    /// Whether the catalogue should be replayed after it is available.
    #[must_use]
    pub const fn should_replay(&self) -> bool {
        !self.catalogue_only && self.output.is_some()
    }
}
