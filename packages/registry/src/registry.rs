//! Inode to destination path registry.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::{Path, PathBuf};

use crate::error::RegistryError;
use crate::store::{InodeStore, MemoryStore, SledStore};

/// Key under which the path for `inode` is stored.
#[must_use]
pub fn inode_key(inode: u64) -> String {
    format!("@{inode}")
}

/// Records the first destination-relative path each source inode was
/// materialized at.
///
/// Pending writes are flushed when the registry is closed or dropped.
pub struct InodeRegistry {
    store: Box<dyn InodeStore>,
    read_only: bool,
    dirty: bool,
}

impl std::fmt::Debug for InodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InodeRegistry")
            .field("entries", &self.store.len())
            .field("read_only", &self.read_only)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl InodeRegistry {
    /// Open the durable registry at `path`.
    ///
    /// # Errors
    ///
    /// * If the database cannot be opened
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        Ok(Self::with_store(Box::new(SledStore::open(path)?)))
    }

    /// Create a registry that lives in memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_store(Box::new(MemoryStore::new()))
    }

    /// Wrap an arbitrary store.
    #[must_use]
    pub fn with_store(store: Box<dyn InodeStore>) -> Self {
        Self {
            store,
            read_only: false,
            dirty: false,
        }
    }

    /// Turn off writes: [`InodeRegistry::set_path`] becomes a no-op.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Whether writes are disabled.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Destination-relative path registered for `inode`.
    ///
    /// # Errors
    ///
    /// * If the store cannot be read
    /// * If the stored value is not valid UTF-8
    pub fn get_path(&self, inode: u64) -> Result<Option<PathBuf>, RegistryError> {
        let Some(value) = self.store.get(&inode_key(inode))? else {
            return Ok(None);
        };
        let path = String::from_utf8(value).map_err(|_| RegistryError::CorruptValue { inode })?;
        Ok(Some(PathBuf::from(path)))
    }

    /// Register `path` for `inode`. A leading `/` is stripped so stored
    /// paths are always relative to the destination root.
    ///
    /// Callers register each inode once; a second call overwrites and is only
    /// expected when repairing a registration whose file has gone missing.
    ///
    /// # Errors
    ///
    /// * If `path` is not valid UTF-8
    /// * If the store cannot be written
    pub fn set_path(&mut self, inode: u64, path: &Path) -> Result<(), RegistryError> {
        if self.read_only {
            log::trace!("Read-only registry, not storing inode {inode}");
            return Ok(());
        }

        let relative = path.strip_prefix("/").unwrap_or(path);
        let value = relative
            .to_str()
            .ok_or_else(|| RegistryError::NonUtf8Path(path.to_path_buf()))?;

        log::debug!("Registering inode {inode} at {value}");
        self.store.set(&inode_key(inode), value.as_bytes())?;
        self.dirty = true;
        Ok(())
    }

    /// Number of registered inodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether no inode is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Push pending registrations to stable storage.
    ///
    /// # Errors
    ///
    /// * If the store cannot be flushed
    pub fn flush(&mut self) -> Result<(), RegistryError> {
        if self.dirty {
            self.store.flush()?;
            self.dirty = false;
        }
        Ok(())
    }

    /// Flush and release the registry.
    ///
    /// # Errors
    ///
    /// * If the final flush fails
    pub fn close(mut self) -> Result<(), RegistryError> {
        log::info!("Copy: closing copy database");
        self.flush()
    }
}

impl Drop for InodeRegistry {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("Failed to flush inode registry: {e}");
        }
    }
}
