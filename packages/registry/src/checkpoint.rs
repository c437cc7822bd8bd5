//! Resume checkpoint.
//!
//! A plain text file holding the last catalogue index reached at a registry
//! flush. It is only trusted when it is at least as recent as the catalogue
//! it refers to.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::RegistryError;

/// Handle on the checkpoint file of one destination.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    path: PathBuf,
}

impl Checkpoint {
    /// Create a handle for the checkpoint stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the checkpoint file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpoint for a replay of `catalogue`.
    ///
    /// Returns `None` when there is no checkpoint, when it is older than the
    /// catalogue, or when its content cannot be parsed.
    ///
    /// # Errors
    ///
    /// * If the checkpoint exists but cannot be read
    pub fn load(&self, catalogue: &Path) -> Result<Option<u64>, RegistryError> {
        let metadata = match fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.error(e)),
        };

        let catalogue_modified = fs::metadata(catalogue)
            .and_then(|m| m.modified())
            .ok();
        let checkpoint_modified = metadata.modified().map_err(|e| self.error(e))?;

        if let Some(catalogue_modified) = catalogue_modified {
            if checkpoint_modified < catalogue_modified {
                log::info!(
                    "Ignoring stale checkpoint {} (older than catalogue {})",
                    self.path.display(),
                    catalogue.display()
                );
                return Ok(None);
            }
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.error(e))?;
        match content.trim().parse::<u64>() {
            Ok(index) => {
                log::debug!("Loaded checkpoint {index} from {}", self.path.display());
                Ok(Some(index))
            }
            Err(_) => {
                log::warn!(
                    "Ignoring unreadable checkpoint {}: {:?}",
                    self.path.display(),
                    content.trim()
                );
                Ok(None)
            }
        }
    }

    /// Persist `index` as the last processed index.
    ///
    /// # Errors
    ///
    /// * If the checkpoint cannot be written
    pub fn store(&self, index: u64) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }

        // Write then rename so a crash never leaves a truncated checkpoint.
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, format!("{index}\n")).map_err(|e| self.error(e))?;
        fs::rename(&staging, &self.path).map_err(|e| self.error(e))?;

        log::debug!("Stored checkpoint {index} at {}", self.path.display());
        Ok(())
    }

    /// Remove the checkpoint. A missing checkpoint is not an error.
    ///
    /// # Errors
    ///
    /// * If the file exists but cannot be removed
    pub fn clear(&self) -> Result<(), RegistryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Cleared checkpoint {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.error(e)),
        }
    }

    fn error(&self, source: std::io::Error) -> RegistryError {
        RegistryError::CheckpointError {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, Checkpoint) {
        let dir = TempDir::new().unwrap();
        let catalogue = dir.path().join("catalogue.lst");
        fs::write(&catalogue, "0:B:/src\n").unwrap();
        let checkpoint = Checkpoint::new(dir.path().join("meta/checkpoint"));
        (dir, catalogue, checkpoint)
    }

    #[test]
    fn test_missing_checkpoint() {
        let (_dir, catalogue, checkpoint) = setup();
        assert_eq!(checkpoint.load(&catalogue).unwrap(), None);
    }

    #[test]
    fn test_store_and_load() {
        let (_dir, catalogue, checkpoint) = setup();
        checkpoint.store(3000).unwrap();

        let newer = FileTime::from_unix_time(2_000_000_000, 0);
        filetime::set_file_mtime(checkpoint.path(), newer).unwrap();

        assert_eq!(checkpoint.load(&catalogue).unwrap(), Some(3000));
        assert_eq!(fs::read_to_string(checkpoint.path()).unwrap(), "3000\n");
    }

    #[test]
    fn test_stale_checkpoint_is_ignored() {
        let (_dir, catalogue, checkpoint) = setup();
        checkpoint.store(1000).unwrap();

        filetime::set_file_mtime(checkpoint.path(), FileTime::from_unix_time(1_000, 0)).unwrap();
        filetime::set_file_mtime(&catalogue, FileTime::from_unix_time(2_000, 0)).unwrap();

        assert_eq!(checkpoint.load(&catalogue).unwrap(), None);
    }

    #[test]
    fn test_garbage_checkpoint_is_ignored() {
        let (_dir, catalogue, checkpoint) = setup();
        fs::create_dir_all(checkpoint.path().parent().unwrap()).unwrap();
        fs::write(checkpoint.path(), "not a number").unwrap();
        filetime::set_file_mtime(checkpoint.path(), FileTime::from_unix_time(2_000_000_000, 0))
            .unwrap();

        assert_eq!(checkpoint.load(&catalogue).unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let (_dir, _catalogue, checkpoint) = setup();
        checkpoint.clear().unwrap();

        checkpoint.store(1).unwrap();
        checkpoint.clear().unwrap();
        assert!(!checkpoint.path().exists());
    }
}
