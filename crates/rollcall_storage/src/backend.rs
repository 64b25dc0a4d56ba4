//! Storage backend trait definition.

use crate::error::StorageResult;
use std::fs::File;

/// A whole-document storage backend.
///
/// Backends store a single document as **opaque bytes**. The document store
/// reads the entire document, mutates it in memory and hands the entire new
/// document back to [`StorageBackend::replace`].
///
/// # Invariants
///
/// - `load` returns `None` until the first successful `replace`
/// - `load` after a successful `replace(data)` returns exactly `data`
/// - A failed or interrupted `replace` leaves the previous document intact
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Loads the whole document.
    ///
    /// Returns `Ok(None)` if the document has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the document exists but cannot be read.
    fn load(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Atomically replaces the whole document with `data`.
    ///
    /// After this returns successfully, a subsequent `load` observes `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The previous document is
    /// left untouched in that case.
    fn replace(&self, data: &[u8]) -> StorageResult<()>;

    /// Writes `initial` only if no document exists yet.
    ///
    /// Returns true if the document was created by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check or the write fails.
    fn ensure_exists(&self, initial: &[u8]) -> StorageResult<bool> {
        if self.load()?.is_some() {
            return Ok(false);
        }
        self.replace(initial)?;
        Ok(true)
    }

    /// Acquires an exclusive advisory lock for a read-modify-write cycle.
    ///
    /// The lock is released when the returned guard is dropped. The default
    /// implementation does not lock anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired.
    fn lock(&self) -> StorageResult<WriteLock> {
        Ok(WriteLock::noop())
    }

    /// Returns a human-readable description of where the document lives.
    fn location(&self) -> String;
}

/// Guard for an exclusive advisory lock taken by [`StorageBackend::lock`].
#[derive(Debug)]
pub struct WriteLock {
    file: Option<File>,
}

impl WriteLock {
    /// Creates a guard that holds nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self { file: None }
    }

    /// Creates a guard that keeps a locked file handle open.
    ///
    /// The lock is released when the handle is closed.
    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self { file: Some(file) }
    }

    /// Returns true if this guard holds an OS-level lock.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}
