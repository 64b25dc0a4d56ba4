//! Crash simulation for whole-document writes.
//!
//! A replace is supposed to be all-or-nothing. This module provides:
//!
//! 1. **[`CrashableBackend`]** - wraps any backend and fails replaces on demand
//! 2. **[`CrashRecoveryHarness`]** - interrupts real file writes between the
//!    staging write and the rename, then reopens the store
//!
//! ## Usage
//!
//! ```rust
//! use rollcall_testkit::crash::CrashRecoveryHarness;
//!
//! let mut harness = CrashRecoveryHarness::with_temp_dir().unwrap();
//! harness.run_all();
//! assert!(harness.all_passed());
//! ```

use rollcall_core::{Config, Database, DocumentStore};
use rollcall_storage::{
    FileBackend, InMemoryBackend, StorageBackend, StorageError, StorageResult, WriteLock,
};
use serde_json::{json, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Points at which a crash can be simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashPoint {
    /// Crash before anything is written.
    BeforeStage,
    /// Crash after the staging file is synced but before the rename.
    AfterStageBeforeRename,
    /// Crash right after the rename.
    AfterRename,
}

/// Result of a crash recovery test.
#[derive(Debug, Clone)]
pub struct CrashRecoveryResult {
    /// Whether the test passed.
    pub passed: bool,
    /// Description of what was tested.
    pub description: String,
    /// Expected records after recovery.
    pub expected_records: usize,
    /// Actual records after recovery.
    pub actual_records: usize,
    /// Any error message.
    pub error: Option<String>,
}

impl CrashRecoveryResult {
    /// Creates a passing result.
    pub fn pass(description: &str, records: usize) -> Self {
        Self {
            passed: true,
            description: description.to_string(),
            expected_records: records,
            actual_records: records,
            error: None,
        }
    }

    /// Creates a failing result.
    pub fn fail(description: &str, expected: usize, actual: usize, error: &str) -> Self {
        Self {
            passed: false,
            description: description.to_string(),
            expected_records: expected,
            actual_records: actual,
            error: Some(error.to_string()),
        }
    }
}

/// A storage backend wrapper that can simulate failed writes.
///
/// A failed replace never reaches the inner backend, which is how an
/// atomic backend behaves when it crashes before publishing.
pub struct CrashableBackend {
    inner: Box<dyn StorageBackend>,
    fail_replaces: AtomicUsize,
    fail_lock: AtomicBool,
    crashed: AtomicBool,
}

impl CrashableBackend {
    /// Creates a new crashable backend wrapping an inner backend.
    pub fn new(inner: Box<dyn StorageBackend>) -> Self {
        Self {
            inner,
            fail_replaces: AtomicUsize::new(0),
            fail_lock: AtomicBool::new(false),
            crashed: AtomicBool::new(false),
        }
    }

    /// Makes the next `count` replaces fail.
    pub fn fail_next_replaces(&self, count: usize) {
        self.fail_replaces.store(count, Ordering::SeqCst);
    }

    /// Sets whether acquiring the write lock should fail.
    pub fn set_fail_on_lock(&self, fail: bool) {
        self.fail_lock.store(fail, Ordering::SeqCst);
    }

    /// Resets the crash state.
    pub fn reset(&self) {
        self.fail_replaces.store(0, Ordering::SeqCst);
        self.fail_lock.store(false, Ordering::SeqCst);
        self.crashed.store(false, Ordering::SeqCst);
    }

    /// Returns whether a simulated failure has happened.
    pub fn has_crashed(&self) -> bool {
        self.crashed.load(Ordering::SeqCst)
    }

    fn simulated(&self, what: &str) -> StorageError {
        self.crashed.store(true, Ordering::SeqCst);
        StorageError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("simulated crash during {what}"),
        ))
    }
}

impl StorageBackend for CrashableBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        self.inner.load()
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        let remaining = self.fail_replaces.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_replaces.store(remaining - 1, Ordering::SeqCst);
            return Err(self.simulated("replace"));
        }
        self.inner.replace(data)
    }

    fn lock(&self) -> StorageResult<WriteLock> {
        if self.fail_lock.load(Ordering::SeqCst) {
            return Err(self.simulated("lock"));
        }
        self.inner.lock()
    }

    fn location(&self) -> String {
        format!("crashable({})", self.inner.location())
    }
}

/// A store backend that shares its [`CrashableBackend`], so a test can
/// keep injecting failures after handing the backend to a store.
pub struct SharedCrashableBackend(pub Arc<CrashableBackend>);

impl StorageBackend for SharedCrashableBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        self.0.load()
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        self.0.replace(data)
    }

    fn lock(&self) -> StorageResult<WriteLock> {
        self.0.lock()
    }

    fn location(&self) -> String {
        self.0.location()
    }
}

/// Creates an in-memory store over a crashable backend, returning the
/// store and a handle for injecting failures.
pub fn crashable_memory_store() -> (Arc<DocumentStore>, Arc<CrashableBackend>) {
    let backend = Arc::new(CrashableBackend::new(Box::new(InMemoryBackend::new())));
    let store = DocumentStore::with_backend(
        Config::default(),
        Box::new(SharedCrashableBackend(Arc::clone(&backend))),
    );
    (Arc::new(store), backend)
}

/// Test harness for interrupted file writes.
pub struct CrashRecoveryHarness {
    /// Directory holding the test database.
    pub db_dir: PathBuf,
    /// Results of crash recovery tests.
    pub results: Vec<CrashRecoveryResult>,
    _temp_dir: Option<TempDir>,
}

impl CrashRecoveryHarness {
    /// Creates a new harness writing into `db_dir`.
    pub fn new(db_dir: impl AsRef<Path>) -> Self {
        Self {
            db_dir: db_dir.as_ref().to_path_buf(),
            results: Vec::new(),
            _temp_dir: None,
        }
    }

    /// Creates a new harness with a temporary directory.
    pub fn with_temp_dir() -> io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let mut harness = Self::new(temp_dir.path());
        harness._temp_dir = Some(temp_dir);
        Ok(harness)
    }

    fn db_path(&self) -> PathBuf {
        self.db_dir.join("db.json")
    }

    fn open_store(&self) -> DocumentStore {
        DocumentStore::open(Config::new().path(self.db_path()))
    }

    /// Writes a database with `count` records in `items`.
    fn seed(&self, count: usize) -> Result<(), String> {
        let _ = fs::remove_file(self.db_path());
        let _ = fs::remove_file(FileBackend::new(&self.db_path()).temp_path());

        let store = self.open_store();
        let records = (0..count).map(|i| json!({ "id": format!("r{i}") })).collect();
        let mut db = Database::new();
        db.put_collection("items", records);
        store.write_database(&db).map_err(|e| e.to_string())
    }

    fn count_after_reopen(&self) -> Result<usize, String> {
        self.open_store()
            .get_collection("items")
            .map(|snapshot| snapshot.len())
            .map_err(|e| e.to_string())
    }

    /// Simulates a crash at `point` while writing `count + 1` records over
    /// a database holding `count`, then checks what a fresh store reads.
    pub fn test_crash_at(&mut self, point: CrashPoint, count: usize) -> CrashRecoveryResult {
        let description = format!("crash {point:?} with {count} records");

        let result = self.seed(count).and_then(|()| {
            let backend = FileBackend::new(&self.db_path());
            let next: Vec<Value> = (0..=count).map(|i| json!({ "id": format!("r{i}") })).collect();
            let bytes =
                serde_json::to_vec_pretty(&json!({ "items": next })).map_err(|e| e.to_string())?;

            let expected = match point {
                CrashPoint::BeforeStage => count,
                CrashPoint::AfterStageBeforeRename => {
                    // Dropped without commit: the rename never happens
                    let staged = backend.stage(&bytes).map_err(|e| e.to_string())?;
                    drop(staged);
                    count
                }
                CrashPoint::AfterRename => {
                    backend
                        .stage(&bytes)
                        .and_then(|staged| staged.commit())
                        .map_err(|e| e.to_string())?;
                    count + 1
                }
            };

            let actual = self.count_after_reopen()?;
            Ok((expected, actual))
        });

        let outcome = match result {
            Ok((expected, actual)) if expected == actual => {
                CrashRecoveryResult::pass(&description, actual)
            }
            Ok((expected, actual)) => {
                CrashRecoveryResult::fail(&description, expected, actual, "record count mismatch")
            }
            Err(e) => CrashRecoveryResult::fail(&description, count, 0, &e),
        };

        self.results.push(outcome.clone());
        outcome
    }

    /// Runs every crash point against a few database sizes.
    pub fn run_all(&mut self) {
        for point in [
            CrashPoint::BeforeStage,
            CrashPoint::AfterStageBeforeRename,
            CrashPoint::AfterRename,
        ] {
            for count in [0, 1, 25] {
                self.test_crash_at(point, count);
            }
        }
    }

    /// Returns true if every recorded test passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}
