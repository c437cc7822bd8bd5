//! Fast catalogue entry counting.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rawcopy_catalogue::CatalogueError;

/// Count the indexed (directory, file and symlink) records of a catalogue,
/// used to size the progress bar.
///
/// Only the kind field is inspected, so lines that are otherwise malformed
/// are still counted.
///
/// # Errors
///
/// * If the catalogue cannot be opened or read
pub fn count_entries(catalogue: &Path) -> Result<u64, CatalogueError> {
    let file = File::open(catalogue).map_err(|e| CatalogueError::OpenError {
        path: catalogue.to_path_buf(),
        source: e,
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    let mut lines = 0;
    let mut count = 0;
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .map_err(|e| CatalogueError::ReadError {
                path: catalogue.to_path_buf(),
                line: lines + 1,
                source: e,
            })?;
        if read == 0 {
            break;
        }
        lines += 1;
        if is_indexed(&buffer) {
            count += 1;
        }
    }

    log::debug!("Catalogue {} has {count} entries", catalogue.display());
    Ok(count)
}

fn is_indexed(line: &[u8]) -> bool {
    let mut fields = line.splitn(3, |&b| b == b':');
    matches!(fields.nth(1), Some(b"D" | b"F" | b"S"))
}
