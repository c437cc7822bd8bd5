//! Key-value backends for the inode registry.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::RegistryError;

/// Minimal key-value interface the registry needs.
pub trait InodeStore {
    /// Look up `key`.
    ///
    /// # Errors
    ///
    /// * If the backend cannot be read
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// * If the backend cannot be written
    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), RegistryError>;

    /// Push pending writes to stable storage.
    ///
    /// # Errors
    ///
    /// * If the backend cannot be flushed
    fn flush(&mut self) -> Result<(), RegistryError>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    /// Whether the store holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Durable store backed by an embedded sled database.
#[derive(Debug)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    ///
    /// * If the parent directory cannot be created
    /// * If the database cannot be opened (including when another process holds it)
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RegistryError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        log::info!("Copy: opening copy database at {}", path.display());
        let db = sled::open(path).map_err(|e| RegistryError::OpenError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self { db })
    }
}

impl InodeStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), RegistryError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RegistryError> {
        let bytes = self.db.flush()?;
        log::trace!("Flushed {bytes} bytes of inode registry");
        Ok(())
    }

    fn len(&self) -> usize {
        self.db.len()
    }
}

/// Volatile store, used for test runs without an on-disk registry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl InodeStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, RegistryError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), RegistryError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RegistryError> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
