//! Directory attributes applied after the directory's contents.
//!
//! Creating an entry inside a directory updates the directory's mtime, and a
//! read-only mode would block the children themselves. Directories are
//! therefore created with default permissions and get their source
//! attributes once the walk has left their subtree.
//!
//! The catalogue lists every `Dir` record of a directory before visiting any
//! of them depth-first, so the directories whose root was entered always form
//! a chain of ancestors of the current root. Leaving a root pops that chain.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::collections::HashMap;
use std::fs::Metadata;
use std::path::{Path, PathBuf};

use crate::copy::apply_attributes;
use crate::options::ReplayOptions;

#[derive(Debug)]
struct PendingDirectory {
    suffix: PathBuf,
    target: PathBuf,
    metadata: Metadata,
}

impl PendingDirectory {
    fn apply(&self, options: &ReplayOptions) {
        log::debug!("Setting directory attributes: {}", self.target.display());
        apply_attributes(&self.metadata, &self.target, options);
    }
}

/// Directories waiting for their attributes.
#[derive(Debug, Default)]
pub struct DeferredDirectories {
    /// Created but their root not entered yet, keyed by suffix.
    waiting: HashMap<PathBuf, PendingDirectory>,
    /// Entered roots, outermost first.
    open: Vec<PendingDirectory>,
    current: Option<PathBuf>,
}

impl DeferredDirectories {
    /// Remember `target` so its attributes are set once its subtree is done.
    pub fn defer(&mut self, suffix: &Path, target: &Path, metadata: &Metadata) {
        let pending = PendingDirectory {
            suffix: suffix.to_path_buf(),
            target: target.to_path_buf(),
            metadata: metadata.clone(),
        };
        if self.current.as_deref() == Some(suffix) {
            self.open.push(pending);
        } else {
            self.waiting.insert(pending.suffix.clone(), pending);
        }
    }

    /// The walk moved to the root at `suffix`: finish every open directory
    /// that does not contain it.
    pub fn enter(&mut self, suffix: &Path, options: &ReplayOptions) {
        while let Some(top) = self.open.last() {
            if suffix.starts_with(&top.suffix) {
                break;
            }
            if let Some(done) = self.open.pop() {
                done.apply(options);
            }
        }
        if let Some(pending) = self.waiting.remove(suffix) {
            self.open.push(pending);
        }
        self.current = Some(suffix.to_path_buf());
    }

    /// Apply everything still pending, deepest directories first.
    pub fn finish(&mut self, options: &ReplayOptions) {
        while let Some(done) = self.open.pop() {
            done.apply(options);
        }

        let mut rest: Vec<_> = self.waiting.drain().map(|(_, pending)| pending).collect();
        rest.sort_by_key(|pending| std::cmp::Reverse(pending.suffix.components().count()));
        for pending in &rest {
            pending.apply(options);
        }
        self.current = None;
    }
}
