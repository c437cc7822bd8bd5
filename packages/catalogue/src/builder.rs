//! Catalogue construction.
//!
//! Walks the source trees top-down and produces records in the exact order
//! the copy engine will replay them. Directory listings are sorted by name so
//! rebuilding an unchanged tree yields an identical catalogue.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::VecDeque;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::entry::{CatalogueEntry, EntryKind, encodable};
use crate::error::CatalogueError;
use crate::node::NodeKind;
use crate::store::write_catalogue;

/// Builds a catalogue for a set of source paths sharing a common base.
#[derive(Debug, Clone)]
pub struct CatalogueBuilder {
    base: PathBuf,
    sources: Vec<PathBuf>,
}

impl CatalogueBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    ///
    /// * `base` - Absolute directory that prefixes every source
    /// * `sources` - Absolute source paths, in the order they should be walked
    #[must_use]
    pub fn new(base: impl Into<PathBuf>, sources: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            base: base.into(),
            sources: sources.into_iter().collect(),
        }
    }

    /// The base directory.
    #[must_use]
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Start a fresh traversal of the sources.
    #[must_use]
    pub fn walk(&self) -> CatalogueWalk {
        CatalogueWalk {
            base: self.base.clone(),
            sources: self.sources.clone().into_iter(),
            pending: VecDeque::new(),
            directories: Vec::new(),
            next_index: 0,
            started: false,
        }
    }

    /// Walk the sources and write the catalogue to `path`.
    ///
    /// Returns the number of records written.
    ///
    /// # Errors
    ///
    /// * If the base cannot be represented in the catalogue
    /// * If the catalogue directory cannot be created
    /// * If the catalogue file cannot be created or written
    pub fn save(&self, path: &Path) -> Result<u64, CatalogueError> {
        // Without its base line the catalogue could never be replayed.
        if encodable(&self.base).is_none() {
            return Err(CatalogueError::UnrepresentableBase(self.base.clone()));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                log::info!("Catalogue: creating catalogue directory {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| CatalogueError::CreateDirError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = fs::File::create(path).map_err(|e| CatalogueError::OpenError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        let written = write_catalogue(&mut writer, self.walk())
            .and_then(|count| writer.flush().map(|()| count))
            .map_err(|e| CatalogueError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;

        log::debug!("Wrote {written} catalogue records to {}", path.display());
        Ok(written)
    }
}

/// Lazy traversal producing catalogue records.
///
/// Created by [`CatalogueBuilder::walk`]. Not restartable: build a new walk
/// to enumerate the sources again.
#[derive(Debug)]
pub struct CatalogueWalk {
    base: PathBuf,
    sources: std::vec::IntoIter<PathBuf>,
    pending: VecDeque<CatalogueEntry>,
    /// Directories still to visit; the next one is at the end.
    directories: Vec<PathBuf>,
    next_index: u64,
    started: bool,
}

impl Iterator for CatalogueWalk {
    type Item = CatalogueEntry;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            if encodable(&self.base).is_none() {
                log::error!(
                    "Catalogue: base {} cannot be represented in the catalogue",
                    self.base.display()
                );
            }
            return Some(CatalogueEntry::new(0, EntryKind::Base, self.base.clone()));
        }

        loop {
            if let Some(entry) = self.pending.pop_front() {
                return Some(entry);
            }
            if let Some(directory) = self.directories.pop() {
                self.visit_directory(&directory);
                continue;
            }
            let source = self.sources.next()?;
            self.visit_source(&source);
        }
    }
}

impl CatalogueWalk {
    fn visit_source(&mut self, source: &Path) {
        let metadata = match fs::symlink_metadata(source) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::error!("Catalogue: cannot read source {}: {e}", source.display());
                return;
            }
        };

        let kind = match NodeKind::of(metadata.file_type()) {
            NodeKind::Special(what) => {
                log::info!("Catalogue: skipping {what}: {}", source.display());
                return;
            }
            NodeKind::Directory => {
                self.directories.push(source.to_path_buf());
                return;
            }
            NodeKind::File => EntryKind::File,
            NodeKind::Symlink => EntryKind::Symlink,
        };

        let (Some(parent), Some(name)) = (source.parent(), source.file_name()) else {
            log::error!("Catalogue: source has no parent: {}", source.display());
            return;
        };

        if self.push_root(parent) {
            self.push_child(kind, name);
        }
    }

    fn visit_directory(&mut self, directory: &Path) {
        if encodable(directory).is_none() {
            log::error!(
                "Catalogue: dropping directory that cannot be represented: {}",
                directory.display()
            );
            return;
        }

        let mut files: Vec<(EntryKind, OsString)> = Vec::new();
        let mut subdirectories: Vec<OsString> = Vec::new();

        for result in jwalk::WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .parallelism(jwalk::Parallelism::Serial)
        {
            match result {
                Ok(child) => {
                    let file_type = child.file_type();
                    let name = child.file_name().to_os_string();
                    if file_type.is_symlink() {
                        files.push((EntryKind::Symlink, name));
                    } else if file_type.is_dir() {
                        subdirectories.push(name);
                    } else {
                        files.push((EntryKind::File, name));
                    }
                }
                Err(e) => {
                    log::warn!("Catalogue: cannot read {}: {e}", directory.display());
                }
            }
        }

        log::info!(
            "Catalogue: {} files {} dirs in {}",
            files.len(),
            subdirectories.len(),
            directory.display()
        );

        self.push_root(directory);
        for (kind, name) in &files {
            self.push_child(*kind, name);
        }

        let mut to_visit = Vec::with_capacity(subdirectories.len());
        for name in &subdirectories {
            if self.push_child(EntryKind::Dir, name) {
                to_visit.push(directory.join(name));
            }
        }
        self.directories.extend(to_visit.into_iter().rev());
    }

    fn push_root(&mut self, directory: &Path) -> bool {
        if encodable(directory).is_none() {
            log::error!(
                "Catalogue: dropping root that cannot be represented: {}",
                directory.display()
            );
            return false;
        }
        self.pending.push_back(CatalogueEntry::new(
            self.next_index,
            EntryKind::Root,
            directory,
        ));
        true
    }

    /// Queue a named child of the current root, consuming an index.
    fn push_child(&mut self, kind: EntryKind, name: &OsStr) -> bool {
        let name = Path::new(name);
        if encodable(name).is_none() {
            log::error!(
                "Catalogue: dropping {kind} that cannot be represented: {}",
                name.display()
            );
            return false;
        }
        self.pending
            .push_back(CatalogueEntry::new(self.next_index, kind, name));
        self.next_index += 1;
        true
    }
}

/// Compute the common ancestor directory of a set of absolute sources.
///
/// The ancestor is computed component-wise; if the result is not a real
/// directory (for instance a single file source), its parent is used.
///
/// Returns `None` if `sources` is empty or has no common ancestor.
#[must_use]
pub fn common_base(sources: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = sources.split_first()?;

    let mut base = first.clone();
    for source in rest {
        base = base
            .components()
            .zip(source.components())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a)
            .collect();
    }

    let is_directory = fs::symlink_metadata(&base).is_ok_and(|m| m.is_dir());
    if is_directory {
        Some(base)
    } else {
        base.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }
}
