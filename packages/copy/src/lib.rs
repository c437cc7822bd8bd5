//! Catalogue replay engine.
//!
//! This crate materializes a catalogue onto a destination root:
//!
//! * Directories, regular files and symlinks are recreated in catalogue order
//! * Files sharing an inode are hard linked to their first copy
//! * Owner, mode and timestamps are carried over
//! * Copy-on-write support via `reflink-copy` (APFS, Btrfs, XFS)
//! * Resumable through a checkpoint, restrictable to an index range
//!
//! # Example
//!
//! ```rust,ignore
//! use rawcopy_copy::{ReplayOptions, replay};
//!
//! let summary = replay(catalogue, destination, &ReplayOptions::default(), |progress| {
//!     println!("{} entries processed", progress.entries_processed);
//! })?;
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod attrs;
mod copy;
mod count;
mod deferred;
mod error;
pub mod layout;
mod link;
mod options;
mod progress;
mod range;
mod replay;

pub use attrs::{AttributeOptions, copy_attributes};
pub use copy::{copy_directory, copy_file, copy_symlink};
pub use count::count_entries;
pub use error::{CopyError, ReplayError};
pub use link::{ensure_inode_path, try_hard_link};
pub use options::{DEFAULT_CHECKPOINT_INTERVAL, KindMismatchPolicy, ReplayOptions};
pub use progress::ReplayProgress;
pub use range::{RangeParseError, ReplayRange};
pub use replay::{ReplaySummary, replay};
