//! Classification of on-disk node types.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::FileType;
use std::os::unix::fs::FileTypeExt;

use crate::entry::EntryKind;

/// What a path actually is on disk, as reported by `lstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A directory.
    Directory,
    /// A regular file.
    File,
    /// A symbolic link (never followed).
    Symlink,
    /// A character/block device, FIFO or socket. Never copied.
    Special(&'static str),
}

impl NodeKind {
    /// Classify a file type obtained without following symlinks.
    #[must_use]
    pub fn of(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_char_device() {
            Self::Special("character device")
        } else if file_type.is_block_device() {
            Self::Special("block device")
        } else if file_type.is_fifo() {
            Self::Special("FIFO")
        } else if file_type.is_socket() {
            Self::Special("socket")
        } else {
            Self::File
        }
    }

    /// Whether a catalogue record of `kind` describes a node of this type.
    #[must_use]
    pub const fn matches(self, kind: EntryKind) -> bool {
        matches!(
            (self, kind),
            (Self::Directory, EntryKind::Dir)
                | (Self::File, EntryKind::File)
                | (Self::Symlink, EntryKind::Symlink)
        )
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Directory => write!(f, "directory"),
            Self::File => write!(f, "file"),
            Self::Symlink => write!(f, "symlink"),
            Self::Special(what) => write!(f, "{what}"),
        }
    }
}
