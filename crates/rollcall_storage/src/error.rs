//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Returns true if this error wraps an I/O error of the given kind.
    #[must_use]
    pub fn is_io_kind(&self, kind: io::ErrorKind) -> bool {
        matches!(self, StorageError::Io(e) if e.kind() == kind)
    }
}
