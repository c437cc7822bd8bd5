//! Single-entry materialization: directories, files and symlinks.
//!
//! Each function logs the action first and returns early in test mode, so a
//! test run produces the same trace as a real one.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, Metadata};
use std::path::Path;

use crate::attrs::copy_attributes;
use crate::error::CopyError;
use crate::options::ReplayOptions;

/// Create `target` as a directory with default permissions.
///
/// The source's attributes are not copied here: children created later would
/// change the mtime, and a read-only mode would keep them from being created.
/// [`replay`](crate::replay) applies them once the directory is complete.
///
/// # Errors
///
/// * If the directory cannot be created
pub fn copy_directory(target: &Path, options: &ReplayOptions) -> Result<(), CopyError> {
    log::info!("Copying directory: {}", target.display());
    if options.test_mode {
        return Ok(());
    }

    fs::create_dir(target).map_err(|e| CopyError::CreateDirError {
        path: target.to_path_buf(),
        io_error: e,
    })
}

/// Copy the content of `source` to a new file at `target`.
///
/// # Arguments
///
/// * `source` - Source file path
/// * `metadata` - `lstat` result of the source
/// * `target` - Target file path, must not exist
/// * `options` - Replay options (test mode, reflink, attributes)
///
/// # Errors
///
/// * If the copy operation fails
pub fn copy_file(
    source: &Path,
    metadata: &Metadata,
    target: &Path,
    options: &ReplayOptions,
) -> Result<(), CopyError> {
    log::info!("Copying file: {}", target.display());
    if options.test_mode {
        return Ok(());
    }

    if options.reflink {
        copy_file_with_reflink(source, target)?;
    } else {
        plain_copy(source, target)?;
    }
    apply_attributes(metadata, target, options);
    Ok(())
}

/// Recreate the symlink `source` at `target` with the same link target.
///
/// # Errors
///
/// * If the link target cannot be read
/// * If the symlink cannot be created
pub fn copy_symlink(
    source: &Path,
    metadata: &Metadata,
    target: &Path,
    options: &ReplayOptions,
) -> Result<(), CopyError> {
    let link_target = fs::read_link(source).map_err(|e| CopyError::ReadLinkError {
        path: source.to_path_buf(),
        io_error: e,
    })?;

    log::info!(
        "Copying link [-> {}]: {}",
        link_target.display(),
        target.display()
    );
    if options.test_mode {
        return Ok(());
    }

    std::os::unix::fs::symlink(&link_target, target).map_err(|e| {
        CopyError::CreateSymlinkError {
            path: target.to_path_buf(),
            io_error: e,
        }
    })?;
    apply_attributes(metadata, target, options);
    Ok(())
}

/// Copy attributes, downgrading failures to warnings.
pub(crate) fn apply_attributes(metadata: &Metadata, target: &Path, options: &ReplayOptions) {
    if options.test_mode {
        return;
    }
    if let Err(e) = copy_attributes(metadata, target, &options.attributes) {
        log::warn!("{e}");
    }
}

/// Copy a single file, trying reflink first then falling back to regular copy.
fn copy_file_with_reflink(source: &Path, target: &Path) -> Result<(), CopyError> {
    match reflink_copy::reflink(source, target) {
        Ok(()) => {
            log::trace!("Reflinked {} -> {}", source.display(), target.display());
            Ok(())
        }
        Err(e) => {
            log::trace!("Reflink unavailable ({e}), falling back to copy");
            plain_copy(source, target)
        }
    }
}

fn plain_copy(source: &Path, target: &Path) -> Result<(), CopyError> {
    fs::copy(source, target).map_err(|e| CopyError::FileCopyError {
        source_path: source.to_path_buf(),
        target_path: target.to_path_buf(),
        io_error: e,
    })?;
    log::trace!("Copied {} -> {}", source.display(), target.display());
    Ok(())
}
