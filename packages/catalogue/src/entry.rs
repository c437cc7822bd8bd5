//! Catalogue record model.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

/// The kind of a catalogue record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Common ancestor of every source tree. Always the first record.
    Base,
    /// Start of a traversal root (absolute path).
    Root,
    /// Subdirectory name under the current root.
    Dir,
    /// File name under the current root.
    File,
    /// Symlink name under the current root.
    Symlink,
}

impl EntryKind {
    /// Single-character tag used in the catalogue file.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Base => 'B',
            Self::Root => 'R',
            Self::Dir => 'D',
            Self::File => 'F',
            Self::Symlink => 'S',
        }
    }

    /// Parse a tag written by [`EntryKind::code`].
    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(Self::Base),
            'R' => Some(Self::Root),
            'D' => Some(Self::Dir),
            'F' => Some(Self::File),
            'S' => Some(Self::Symlink),
            _ => None,
        }
    }

    /// Whether this record frames other records rather than naming a
    /// filesystem node. Container records do not consume an index.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Base | Self::Root)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Root => write!(f, "root"),
            Self::Dir => write!(f, "directory"),
            Self::File => write!(f, "file"),
            Self::Symlink => write!(f, "symlink"),
        }
    }
}

/// A single catalogue record.
///
/// `Base` and `Root` carry absolute paths; `Dir`, `File` and `Symlink`
/// carry a single component name relative to the most recent `Root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueEntry {
    /// Index of this record. Container records carry the index of the
    /// record that follows them.
    pub index: u64,
    /// Record kind.
    pub kind: EntryKind,
    /// Record path.
    pub path: PathBuf,
}

impl CatalogueEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(index: u64, kind: EntryKind, path: impl Into<PathBuf>) -> Self {
        Self {
            index,
            kind,
            path: path.into(),
        }
    }

    /// The path as it appears in the catalogue file, or `None` if it cannot
    /// be written as a single UTF-8 line.
    #[must_use]
    pub fn encoded_path(&self) -> Option<&str> {
        encodable(&self.path)
    }
}

/// Returns the UTF-8 form of `path` if it can be stored on one catalogue line.
pub(crate) fn encodable(path: &Path) -> Option<&str> {
    path.to_str().filter(|s| !s.contains('\n'))
}

impl fmt::Display for CatalogueEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.index,
            self.kind.code(),
            self.path.display()
        )
    }
}

/// Reasons a catalogue line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryParseError {
    /// The line has fewer than three `:`-separated fields.
    #[error("expected `index:kind:path`, found {0:?}")]
    MissingField(String),

    /// The index field is not an unsigned integer.
    #[error("invalid index {0:?}")]
    InvalidIndex(String),

    /// The kind field is not one of `B`, `R`, `D`, `F`, `S`.
    #[error("unknown entry kind {0:?}")]
    UnknownKind(String),

    /// The path field is empty.
    #[error("empty path")]
    EmptyPath,

    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidEncoding,
}

impl FromStr for CatalogueEntry {
    type Err = EntryParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        // Paths may contain ':', so only the first two separators count.
        let mut fields = line.splitn(3, ':');
        let (Some(index), Some(kind), Some(path)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(EntryParseError::MissingField(line.to_string()));
        };

        let index = index
            .parse::<u64>()
            .map_err(|_| EntryParseError::InvalidIndex(index.to_string()))?;

        let mut chars = kind.chars();
        let kind = match (chars.next(), chars.next()) {
            (Some(code), None) => EntryKind::from_code(code),
            _ => None,
        }
        .ok_or_else(|| EntryParseError::UnknownKind(kind.to_string()))?;

        if path.is_empty() {
            return Err(EntryParseError::EmptyPath);
        }

        Ok(Self::new(index, kind, path))
    }
}
