//! Catalogue of source trees for rawcopy.
//!
//! A catalogue is a flat, ordered list of records describing one or more
//! source trees. It is built once and then replayed (possibly several times,
//! possibly in pieces) by the copy engine.
//!
//! * [`CatalogueEntry`] / [`EntryKind`] - the record model
//! * [`CatalogueBuilder`] - walks the sources and produces entries lazily
//! * [`CatalogueReader`] / [`write_catalogue`] - the line-oriented file format
//!
//! # Example
//!
//! ```rust,ignore
//! use rawcopy_catalogue::{CatalogueBuilder, CatalogueReader, common_base};
//!
//! let base = common_base(&sources).unwrap();
//! CatalogueBuilder::new(base, sources).save(&catalogue_path)?;
//!
//! for entry in CatalogueReader::open(&catalogue_path)? {
//!     println!("{}", entry?);
//! }
//! ```

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod builder;
mod entry;
mod error;
mod node;
mod store;

pub use builder::{CatalogueBuilder, CatalogueWalk, common_base};
pub use entry::{CatalogueEntry, EntryKind, EntryParseError};
pub use error::CatalogueError;
pub use node::NodeKind;
pub use store::{CatalogueReader, write_catalogue};
