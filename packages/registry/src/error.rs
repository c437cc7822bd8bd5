//! Error types for the inode registry and checkpoint.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while using the registry or checkpoint.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to open the backing database.
    #[error("Failed to open inode registry {}: {source}", path.display())]
    OpenError {
        /// Database path.
        path: PathBuf,
        /// The underlying sled error.
        #[source]
        source: sled::Error,
    },

    /// Failed to create the directory holding the registry.
    #[error("Failed to create registry directory {}: {source}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A read, write or flush on the backing database failed.
    #[error("Inode registry operation failed: {0}")]
    StoreError(#[from] sled::Error),

    /// A stored path is not valid UTF-8.
    #[error("Inode registry holds an invalid path for inode {inode}")]
    CorruptValue {
        /// The inode whose value could not be decoded.
        inode: u64,
    },

    /// A path to register is not valid UTF-8.
    #[error("Cannot register non UTF-8 path {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// Failed to read or write the checkpoint file.
    #[error("Checkpoint error at {}: {source}", path.display())]
    CheckpointError {
        /// Checkpoint path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
