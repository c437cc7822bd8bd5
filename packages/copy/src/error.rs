//! Error types for copy operations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use rawcopy_catalogue::{CatalogueError, EntryKind, NodeKind};
use rawcopy_registry::RegistryError;

/// Errors affecting a single catalogue entry.
///
/// The replay loop logs these and moves on, except for
/// [`CopyError::Registry`], which it escalates.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Failed to create target directory.
    #[error("Failed to create directory {}: {io_error}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to copy a file.
    #[error("Failed to copy {} to {}: {io_error}", source_path.display(), target_path.display())]
    FileCopyError {
        /// Source file path.
        source_path: PathBuf,
        /// Target file path.
        target_path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to create a hard link to a previously copied file.
    #[error("Failed to hard link {} to {}: {io_error}", target_path.display(), link_source.display())]
    HardLinkError {
        /// Already copied file the link points at.
        link_source: PathBuf,
        /// Path of the new link.
        target_path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to read symlink target.
    #[error("Failed to read symlink {}: {io_error}", path.display())]
    ReadLinkError {
        /// The symlink path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to create symlink.
    #[error("Failed to create symlink {}: {io_error}", path.display())]
    CreateSymlinkError {
        /// The symlink path.
        path: PathBuf,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// Failed to copy an attribute (owner, mode, timestamps).
    #[error("Failed to set {attribute} of {}: {io_error}", path.display())]
    AttributeError {
        /// The destination path.
        path: PathBuf,
        /// Which attribute could not be set.
        attribute: &'static str,
        /// The underlying IO error.
        io_error: std::io::Error,
    },

    /// The inode registry failed.
    #[error("Inode registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors that abort a replay.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The catalogue could not be opened or read.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// The inode registry or checkpoint failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Failed to create the destination root.
    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateOutputError {
        /// The destination root.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The catalogue base directory does not exist.
    #[error("Base directory does not exist: {}", .0.display())]
    MissingBase(PathBuf),

    /// The catalogue declares more than one base.
    #[error("Catalogue declares a second base {} after {}", second.display(), first.display())]
    DuplicateBase {
        /// Base declared first.
        first: PathBuf,
        /// Offending base.
        second: PathBuf,
    },

    /// A record appeared before the base record.
    #[error("Catalogue must have a base directory before record {index}")]
    EntryBeforeBase {
        /// Index of the offending record.
        index: u64,
    },

    /// A record appeared before any root record.
    #[error("Catalogue must have a root before record {index}")]
    EntryBeforeRoot {
        /// Index of the offending record.
        index: u64,
    },

    /// A root is not located under the base.
    #[error("Catalogue roots must be prefixed by the base, base={}, root={}", base.display(), root.display())]
    RootOutsideBase {
        /// The catalogue base.
        base: PathBuf,
        /// The offending root.
        root: PathBuf,
    },

    /// A record path is not a single name component.
    #[error("Invalid path in catalogue record {index}: {}", path.display())]
    InvalidEntryPath {
        /// Index of the offending record.
        index: u64,
        /// The offending path.
        path: PathBuf,
    },

    /// Declared kind and on-disk type disagree under the strict policy.
    #[error("Record {index} ({}) is catalogued as {declared} but is a {actual}", path.display())]
    KindMismatch {
        /// Index of the offending record.
        index: u64,
        /// Source path.
        path: PathBuf,
        /// Kind recorded in the catalogue.
        declared: EntryKind,
        /// Type found on disk.
        actual: NodeKind,
    },
}
