//! CLI command implementations.

pub mod dump;
pub mod import;
pub mod inspect;
pub mod verify;

use rollcall_core::{Config, DocumentStore};
use std::path::Path;

/// Opens a store that never creates the file as a side effect of reading.
pub fn open_read_only(path: &Path) -> DocumentStore {
    DocumentStore::open(Config::new().path(path).create_if_missing(false))
}
