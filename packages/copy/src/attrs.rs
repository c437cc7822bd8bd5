//! POSIX attribute copy.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, Metadata};
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use filetime::FileTime;

use crate::error::CopyError;

/// Which attributes to carry over besides mode and timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeOptions {
    /// Copy owner and group. Needs privileges when they differ from the
    /// running user.
    pub ownership: bool,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self { ownership: true }
    }
}

/// Copy owner, mode and timestamps from `metadata` onto `destination`.
///
/// Symlinks are never followed. Mode is not applied to symlinks. Every
/// attribute is attempted even if an earlier one failed.
///
/// # Arguments
///
/// * `metadata` - `lstat` result of the source
/// * `destination` - Path to update
/// * `options` - Attribute selection
///
/// # Errors
///
/// * The first attribute that could not be set
pub fn copy_attributes(
    metadata: &Metadata,
    destination: &Path,
    options: &AttributeOptions,
) -> Result<(), CopyError> {
    let mut first_error = None;
    let mut record = |attribute: &'static str, result: std::io::Result<()>| {
        if let Err(io_error) = result {
            log::debug!(
                "Failed to set {attribute} of {}: {io_error}",
                destination.display()
            );
            if first_error.is_none() {
                first_error = Some(CopyError::AttributeError {
                    path: destination.to_path_buf(),
                    attribute,
                    io_error,
                });
            }
        }
    };

    if options.ownership {
        record(
            "owner",
            std::os::unix::fs::lchown(destination, Some(metadata.uid()), Some(metadata.gid())),
        );
    }

    if !metadata.file_type().is_symlink() {
        record(
            "mode",
            fs::set_permissions(destination, metadata.permissions()),
        );
    }

    let atime = FileTime::from_last_access_time(metadata);
    let mtime = FileTime::from_last_modification_time(metadata);
    record(
        "timestamps",
        filetime::set_symlink_file_times(destination, atime, mtime),
    );

    first_error.map_or(Ok(()), Err)
}
