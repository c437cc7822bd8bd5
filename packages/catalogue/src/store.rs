//! Line-oriented catalogue file format.
//!
//! One record per line: `index:kind:path\n`, UTF-8 encoded.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::entry::{CatalogueEntry, EntryParseError};
use crate::error::CatalogueError;

/// Write entries to `writer`, one line each.
///
/// Entries whose path cannot be written as a single UTF-8 line are dropped
/// and logged. Returns the number of records written.
///
/// # Errors
///
/// * If writing to `writer` fails
pub fn write_catalogue<W, I>(writer: &mut W, entries: I) -> io::Result<u64>
where
    W: Write,
    I: IntoIterator<Item = CatalogueEntry>,
{
    let mut written = 0;
    for entry in entries {
        let Some(path) = entry.encoded_path() else {
            log::error!(
                "Catalogue: dropping {} {} that cannot be encoded",
                entry.kind,
                entry.path.display()
            );
            continue;
        };
        writeln!(writer, "{}:{}:{}", entry.index, entry.kind.code(), path)?;
        written += 1;
    }
    Ok(written)
}

/// Sequential reader over a catalogue file.
///
/// Yields entries in file order. Malformed lines are logged and skipped;
/// only I/O failures are returned as errors.
#[derive(Debug)]
pub struct CatalogueReader<R> {
    reader: R,
    path: PathBuf,
    line: u64,
    buffer: Vec<u8>,
    failed: bool,
}

impl CatalogueReader<BufReader<File>> {
    /// Open the catalogue at `path`.
    ///
    /// # Errors
    ///
    /// * If the file cannot be opened
    pub fn open(path: &Path) -> Result<Self, CatalogueError> {
        log::debug!("Opening catalogue {}", path.display());
        let file = File::open(path).map_err(|e| CatalogueError::OpenError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::with_path(BufReader::new(file), path))
    }
}

impl<R: BufRead> CatalogueReader<R> {
    /// Read a catalogue from an already opened reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_path(reader, Path::new("<catalogue>"))
    }

    fn with_path(reader: R, path: &Path) -> Self {
        Self {
            reader,
            path: path.to_path_buf(),
            line: 0,
            buffer: Vec::new(),
            failed: false,
        }
    }

    fn parse_buffer(&self) -> Result<CatalogueEntry, EntryParseError> {
        let line = self
            .buffer
            .strip_suffix(b"\n")
            .unwrap_or(self.buffer.as_slice());
        std::str::from_utf8(line)
            .map_err(|_| EntryParseError::InvalidEncoding)?
            .parse()
    }
}

impl<R: BufRead> Iterator for CatalogueReader<R> {
    type Item = Result<CatalogueEntry, CatalogueError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            self.buffer.clear();
            match self.reader.read_until(b'\n', &mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => self.line += 1,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(CatalogueError::ReadError {
                        path: self.path.clone(),
                        line: self.line + 1,
                        source: e,
                    }));
                }
            }

            match self.parse_buffer() {
                Ok(entry) => return Some(Ok(entry)),
                Err(e) => {
                    log::error!(
                        "Skipping malformed catalogue line {}:{}: {e}",
                        self.path.display(),
                        self.line
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    fn read_all(content: &[u8]) -> Vec<CatalogueEntry> {
        CatalogueReader::new(content)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_reads_entries_in_order() {
        let entries = read_all(b"0:B:/src\n0:R:/src\n0:F:a\n1:F:b\n");

        assert_eq!(
            entries,
            vec![
                CatalogueEntry::new(0, EntryKind::Base, "/src"),
                CatalogueEntry::new(0, EntryKind::Root, "/src"),
                CatalogueEntry::new(0, EntryKind::File, "a"),
                CatalogueEntry::new(1, EntryKind::File, "b"),
            ]
        );
    }

    #[test]
    fn test_skips_malformed_lines() {
        let mut content = b"0:B:/src\ngarbage\n0:X:what\n0:R:/src\n".to_vec();
        content.extend_from_slice(b"0:F:\xff\xfe\n");
        content.extend_from_slice(b"0:F:kept\n");

        let entries = read_all(&content);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], CatalogueEntry::new(0, EntryKind::File, "kept"));
    }

    #[test]
    fn test_last_line_without_newline() {
        let entries = read_all(b"0:B:/src\n0:R:/src\n0:D:tail");
        assert_eq!(entries[2], CatalogueEntry::new(0, EntryKind::Dir, "tail"));
    }

    #[test]
    fn test_write_drops_unencodable_paths() {
        let bad = OsStr::from_bytes(b"bad\xffname");
        let entries = vec![
            CatalogueEntry::new(0, EntryKind::Base, "/src"),
            CatalogueEntry::new(0, EntryKind::Root, "/src"),
            CatalogueEntry::new(0, EntryKind::File, bad),
            CatalogueEntry::new(1, EntryKind::File, "with:colon"),
        ];

        let mut out = Vec::new();
        let written = write_catalogue(&mut out, entries).unwrap();

        assert_eq!(written, 3);
        assert_eq!(out, b"0:B:/src\n0:R:/src\n1:F:with:colon\n");

        let reread = read_all(&out);
        assert_eq!(reread[2].path, PathBuf::from("with:colon"));
    }

    #[test]
    fn test_open_missing_file() {
        let result = CatalogueReader::open(Path::new("/nonexistent/catalogue.lst"));
        assert!(matches!(result, Err(CatalogueError::OpenError { .. })));
    }
}
