//! Error types for catalogue operations.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing or reading a catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// Failed to create the directory holding the catalogue.
    #[error("Failed to create catalogue directory {}: {source}", path.display())]
    CreateDirError {
        /// The directory path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to open the catalogue file.
    #[error("Failed to open catalogue {}: {source}", path.display())]
    OpenError {
        /// The catalogue path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a catalogue record.
    #[error("Failed to write catalogue {}: {source}", path.display())]
    WriteError {
        /// The catalogue path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a catalogue line.
    #[error("Failed to read catalogue {} at line {line}: {source}", path.display())]
    ReadError {
        /// The catalogue path.
        path: PathBuf,
        /// Line number (1-based) being read.
        line: u64,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The base path cannot be written as a catalogue record.
    #[error("Base {} cannot be represented in a catalogue", .0.display())]
    UnrepresentableBase(PathBuf),
}
