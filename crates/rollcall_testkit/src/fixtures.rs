//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use rollcall_core::{Config, DocumentStore, FixedClock, Resources, StudentDirectory};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Timestamp returned by fixture clocks.
pub const FIXED_NOW: &str = "2024-01-01T00:00:00.000Z";

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store instance.
    pub store: Arc<DocumentStore>,
    path: Option<PathBuf>,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self {
            store: Arc::new(DocumentStore::open_in_memory()),
            path: None,
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test store in a temporary directory.
    pub fn file() -> Self {
        Self::file_with(|config| config)
    }

    /// Creates a file-based test store, letting the caller adjust the
    /// configuration. The path is always set to a fresh temporary file.
    pub fn file_with(adjust: impl FnOnce(Config) -> Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("db.json");
        let config = adjust(Config::new()).path(&path);

        Self {
            store: Arc::new(DocumentStore::open(config)),
            path: Some(path),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database file path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns resources over this store with the clock fixed at [`FIXED_NOW`].
    pub fn resources(&self) -> Resources {
        fixed_resources(&self.store)
    }

    /// Returns a student directory over this store.
    pub fn directory(&self) -> StudentDirectory {
        StudentDirectory::new(self.resources())
    }
}

impl std::ops::Deref for TestStore {
    type Target = DocumentStore;

    fn deref(&self) -> &Self::Target {
        &self.store
    }
}

/// Returns resources over `store` with the clock fixed at [`FIXED_NOW`].
pub fn fixed_resources(store: &Arc<DocumentStore>) -> Resources {
    Resources::with_clock(Arc::clone(store), Arc::new(FixedClock::new(FIXED_NOW)))
}

/// Runs a test with a temporary in-memory store.
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Arc<DocumentStore>) -> R,
{
    let test_store = TestStore::memory();
    f(&test_store.store)
}

/// Runs a test with a temporary file-based store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Arc<DocumentStore>, &Path) -> R,
{
    let test_store = TestStore::file();
    let path = test_store
        .path()
        .expect("File store should have a path")
        .to_path_buf();
    f(&test_store.store, &path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use rollcall_core::StudentForm;
    use serde_json::json;

    /// Students used by [`seeded_students`], as `(name, class, email)`.
    pub const SAMPLE_STUDENTS: [(&str, &str, &str); 3] = [
        ("Ahmad Subagja", "XII IPA 1", "ahmad.s@email.com"),
        ("Budi Santoso", "XI IPS 3", "budi.s@email.com"),
        ("Citra Lestari", "X-1", "citra.l@email.com"),
    ];

    /// Creates a store with `count` records in `collection`.
    ///
    /// Each record has a `seq` field holding its insertion index.
    pub fn populated_store(collection: &str, count: usize) -> TestStore {
        let test_store = TestStore::memory();
        let resources = test_store.resources();

        for seq in 0..count {
            resources
                .create(collection, &json!({ "seq": seq }))
                .expect("Failed to populate store");
        }

        test_store
    }

    /// Creates a store holding [`SAMPLE_STUDENTS`].
    pub fn seeded_students() -> TestStore {
        let test_store = TestStore::memory();
        let directory = test_store.directory();

        for (name, class, email) in SAMPLE_STUDENTS {
            directory
                .add(&StudentForm::new(name, class, email))
                .expect("Failed to seed students");
        }

        test_store
    }
}
