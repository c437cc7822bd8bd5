//! Hard-link reconstruction through the inode registry.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use rawcopy_registry::{InodeRegistry, RegistryError};

use crate::copy::apply_attributes;
use crate::error::CopyError;
use crate::options::ReplayOptions;

/// Hard link `target` to the first copy of the source's inode, if one was
/// registered.
///
/// Only regular files are linked. Returns `Ok(false)` when the caller should
/// copy the file instead: the source is not a regular file, `target` already
/// exists, the inode is unknown, or its registered copy has disappeared.
///
/// # Arguments
///
/// * `registry` - Inode registry of this destination
/// * `destination_root` - Root registered paths are relative to
/// * `metadata` - `lstat` result of the source
/// * `target` - Path of the new link
/// * `options` - Replay options
///
/// # Errors
///
/// * If the registry lookup fails
/// * If the link cannot be created for another reason than a missing source
pub fn try_hard_link(
    registry: &InodeRegistry,
    destination_root: &Path,
    metadata: &Metadata,
    target: &Path,
    options: &ReplayOptions,
) -> Result<bool, CopyError> {
    if !metadata.file_type().is_file() {
        return Ok(false);
    }
    if fs::symlink_metadata(target).is_ok() {
        return Ok(false);
    }

    let inode = metadata.ino();
    let Some(registered) = registry.get_path(inode)? else {
        return Ok(false);
    };
    let link_source = destination_root.join(&registered);

    log::info!(
        "Hard linking file: {} -> {}",
        target.display(),
        registered.display()
    );
    if options.test_mode {
        return Ok(true);
    }

    match fs::hard_link(&link_source, target) {
        Ok(()) => {
            apply_attributes(metadata, target, options);
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!(
                "Registered copy of inode {inode} is missing at {}, copying again",
                link_source.display()
            );
            Ok(false)
        }
        Err(e) => Err(CopyError::HardLinkError {
            link_source,
            target_path: target.to_path_buf(),
            io_error: e,
        }),
    }
}

/// Register `path` for the source inode when it has no registration yet.
///
/// Used for entries whose destination already exists, so later hard links
/// still find a target after the registry was lost or reset.
///
/// Returns whether a registration was added.
///
/// # Errors
///
/// * If the registry cannot be read or written
pub fn ensure_inode_path(
    registry: &mut InodeRegistry,
    metadata: &Metadata,
    path: &Path,
) -> Result<bool, RegistryError> {
    if !metadata.file_type().is_file() {
        return Ok(false);
    }

    let inode = metadata.ino();
    if registry.get_path(inode)?.is_some() {
        return Ok(false);
    }

    log::info!("Copy: remapping inode {inode} to {}", path.display());
    registry.set_path(inode, path)?;
    Ok(!registry.is_read_only())
}
