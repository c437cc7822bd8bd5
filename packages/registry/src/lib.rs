//! Persistent state for resumable rawcopy replays.
//!
//! * [`InodeRegistry`] maps a source inode to the first destination-relative
//!   path it was copied to, so later occurrences become hard links.
//! * [`Checkpoint`] remembers the last catalogue index reached at a flush
//!   boundary, so an interrupted replay can resume.
//!
//! The registry sits on top of the small [`InodeStore`] interface. The
//! durable implementation is [`SledStore`]; [`MemoryStore`] keeps everything
//! in memory.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

mod checkpoint;
mod error;
mod registry;
mod store;

pub use checkpoint::Checkpoint;
pub use error::RegistryError;
pub use registry::{InodeRegistry, inode_key};
pub use store::{InodeStore, MemoryStore, SledStore};
