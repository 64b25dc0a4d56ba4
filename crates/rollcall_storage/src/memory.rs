//! In-memory storage backend for testing.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend keeps the document in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads. A replace
/// swaps the whole buffer under a write lock, so readers never see a
/// partial document.
///
/// # Example
///
/// ```rust
/// use rollcall_storage::{StorageBackend, InMemoryBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.replace(b"{}").unwrap();
/// assert_eq!(backend.data(), Some(b"{}".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Option<Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new backend with no document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new backend holding an existing document.
    ///
    /// Useful for testing how malformed or legacy content is read.
    #[must_use]
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: RwLock::new(Some(data.into())),
        }
    }

    /// Returns a copy of the current document, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.data.read().clone()
    }

    /// Removes the document, as if it had never been written.
    pub fn clear(&self) {
        *self.data.write() = None;
    }
}

impl StorageBackend for InMemoryBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().clone())
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        *self.data.write() = Some(data.to_vec());
        Ok(())
    }

    fn ensure_exists(&self, initial: &[u8]) -> StorageResult<bool> {
        let mut data = self.data.write();
        if data.is_some() {
            return Ok(false);
        }
        *data = Some(initial.to_vec());
        Ok(true)
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_starts_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn memory_replace_and_load() {
        let backend = InMemoryBackend::new();
        backend.replace(b"first").unwrap();
        backend.replace(b"second").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"second");
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(b"seed".to_vec());
        assert_eq!(backend.data(), Some(b"seed".to_vec()));
    }

    #[test]
    fn memory_clear() {
        let backend = InMemoryBackend::with_data("x");
        backend.clear();
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn memory_ensure_exists() {
        let backend = InMemoryBackend::new();
        assert!(backend.ensure_exists(b"{}").unwrap());
        assert!(!backend.ensure_exists(b"[]").unwrap());
        assert_eq!(backend.data(), Some(b"{}".to_vec()));
    }

    #[test]
    fn memory_lock_is_noop() {
        let backend = InMemoryBackend::new();
        let guard = backend.lock().unwrap();
        assert!(!guard.is_held());
        assert_eq!(backend.location(), "memory");
    }

    #[test]
    fn memory_shared_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let backend = Arc::new(InMemoryBackend::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || backend.replace(format!("{i}").as_bytes()).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let data = backend.data().unwrap();
        assert_eq!(data.len(), 1);
    }
}
