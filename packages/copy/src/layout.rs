//! Metadata files kept under the destination root.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

/// Directory holding rawcopy's own files.
pub const METADATA_DIR: &str = "__rawcopy__";
/// Default catalogue file name.
pub const CATALOGUE_FILE: &str = "catalogue.lst";
/// Inode registry database name.
pub const REGISTRY_FILE: &str = "copy.db";
/// Checkpoint file name.
pub const CHECKPOINT_FILE: &str = "checkpoint";

#[must_use]
pub fn metadata_dir(destination: &Path) -> PathBuf {
    destination.join(METADATA_DIR)
}

#[must_use]
pub fn registry_path(destination: &Path) -> PathBuf {
    metadata_dir(destination).join(REGISTRY_FILE)
}

#[must_use]
pub fn checkpoint_path(destination: &Path) -> PathBuf {
    metadata_dir(destination).join(CHECKPOINT_FILE)
}

/// Catalogue used when none is given explicitly.
#[must_use]
pub fn default_catalogue_path(destination: &Path) -> PathBuf {
    metadata_dir(destination).join(CATALOGUE_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let root = Path::new("/backup");
        assert_eq!(registry_path(root), Path::new("/backup/__rawcopy__/copy.db"));
        assert_eq!(
            checkpoint_path(root),
            Path::new("/backup/__rawcopy__/checkpoint")
        );
        assert_eq!(
            default_catalogue_path(root),
            Path::new("/backup/__rawcopy__/catalogue.lst")
        );
    }
}
