//! Document store.

use crate::collection::CollectionSnapshot;
use crate::config::Config;
use crate::database::Database;
use crate::error::CoreResult;
use parking_lot::Mutex;
use rollcall_storage::{FileBackend, InMemoryBackend, StorageBackend, WriteLock};
use std::fmt;

/// What a transaction closure wants done with its changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Write the modified database back and return the value.
    Commit(T),
    /// Return the value without writing anything.
    Discard(T),
}

impl<T> Outcome<T> {
    fn into_parts(self) -> (bool, T) {
        match self {
            Outcome::Commit(value) => (true, value),
            Outcome::Discard(value) => (false, value),
        }
    }
}

/// A JSON document store persisted as a single file.
///
/// Every read loads and parses the whole document. Every write serializes
/// the whole database and atomically replaces the stored document, so a
/// reader never sees a partially written file.
///
/// # Concurrency
///
/// By default a read-modify-write cycle is not isolated: two concurrent
/// cycles may read the same state and the later write wins. With
/// [`Config::exclusive_writes`] enabled, [`DocumentStore::transact`] holds
/// an in-process mutex and the backend's advisory lock for the whole cycle.
///
/// # Example
///
/// ```rust
/// use rollcall_core::{DocumentStore, Outcome};
/// use serde_json::json;
///
/// let store = DocumentStore::open_in_memory();
/// store
///     .transact_collection("students", |students| {
///         students.push(json!({"id": "a", "name": "Ada"}));
///         Ok(Outcome::Commit(()))
///     })
///     .unwrap();
///
/// assert_eq!(store.get_collection("students").unwrap().len(), 1);
/// ```
pub struct DocumentStore {
    config: Config,
    backend: Box<dyn StorageBackend>,
    write_gate: Mutex<()>,
}

impl DocumentStore {
    /// Opens a store backed by the file at `config.path`.
    ///
    /// Nothing is read or created until the first operation.
    #[must_use]
    pub fn open(config: Config) -> Self {
        let backend = FileBackend::new(&config.path);
        Self::with_backend(config, Box::new(backend))
    }

    /// Opens a store that keeps its document in memory.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::with_backend(Config::default(), Box::new(InMemoryBackend::new()))
    }

    /// Opens a store over an arbitrary backend.
    ///
    /// `config.path` is ignored; the backend decides where bytes live.
    #[must_use]
    pub fn with_backend(config: Config, backend: Box<dyn StorageBackend>) -> Self {
        Self {
            config,
            backend,
            write_gate: Mutex::new(()),
        }
    }

    /// Returns the store configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a description of where the document is stored.
    #[must_use]
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Reads and parses the whole database.
    ///
    /// If no document exists yet, an empty database is returned. With
    /// `create_if_missing` enabled, `{}` is also written so the file exists
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the document cannot be read, `Serialization` if
    /// it is not valid JSON, and `InvalidFormat` if its root is not an object.
    pub fn read_database(&self) -> CoreResult<Database> {
        if let Some(bytes) = self.backend.load()? {
            return Database::from_slice(&bytes);
        }

        if !self.config.create_if_missing {
            return Ok(Database::new());
        }

        let empty = Database::new();
        if self.backend.ensure_exists(&empty.to_pretty_bytes()?)? {
            tracing::info!(location = %self.location(), "initialized empty database");
            return Ok(empty);
        }

        // Another writer created the document first
        match self.backend.load()? {
            Some(bytes) => Database::from_slice(&bytes),
            None => Ok(empty),
        }
    }

    /// Serializes `database` and atomically replaces the stored document.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails. The previous document is left
    /// intact in that case.
    pub fn write_database(&self, database: &Database) -> CoreResult<()> {
        let bytes = database.to_pretty_bytes()?;
        self.backend.replace(&bytes)?;
        tracing::debug!(
            location = %self.location(),
            collections = database.len(),
            bytes = bytes.len(),
            "wrote database"
        );
        Ok(())
    }

    /// Reads the database and takes out the named collection.
    ///
    /// A missing collection comes back empty. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns any error from [`DocumentStore::read_database`], or
    /// `InvalidFormat` if the collection is not an array.
    pub fn get_collection(&self, name: &str) -> CoreResult<CollectionSnapshot> {
        CollectionSnapshot::take(self.read_database()?, name)
    }

    /// Writes back the database a snapshot was taken from, including the
    /// snapshot's current records.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the write fails.
    pub fn commit(&self, snapshot: CollectionSnapshot) -> CoreResult<()> {
        self.write_database(&snapshot.into_database())
    }

    /// Runs a read-modify-write cycle over the whole database.
    ///
    /// The closure receives the freshly read database. If it returns
    /// [`Outcome::Commit`] the database is written back; on
    /// [`Outcome::Discard`] or an error nothing is written.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or any read or write error.
    pub fn transact<T, F>(&self, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut Database) -> CoreResult<Outcome<T>>,
    {
        let _guard = self.exclusive()?;

        let mut database = self.read_database()?;
        let (commit, value) = f(&mut database)?.into_parts();
        if commit {
            self.write_database(&database)?;
        }
        Ok(value)
    }

    /// Runs a read-modify-write cycle over one collection.
    ///
    /// Same as [`DocumentStore::transact`], but the closure sees only the
    /// named collection. The rest of the database is written back unchanged.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or any read or write error.
    pub fn transact_collection<T, F>(&self, name: &str, f: F) -> CoreResult<T>
    where
        F: FnOnce(&mut CollectionSnapshot) -> CoreResult<Outcome<T>>,
    {
        let _guard = self.exclusive()?;

        let mut snapshot = self.get_collection(name)?;
        let (commit, value) = f(&mut snapshot)?.into_parts();
        if commit {
            self.commit(snapshot)?;
        }
        Ok(value)
    }

    fn exclusive(&self) -> CoreResult<Option<ExclusiveGuard<'_>>> {
        if !self.config.exclusive_writes {
            return Ok(None);
        }

        // In-process writers queue on the mutex before touching the file lock
        let gate = self.write_gate.lock();
        let lock = self.backend.lock()?;
        Ok(Some(ExclusiveGuard {
            _lock: lock,
            _gate: gate,
        }))
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("location", &self.location())
            .field("config", &self.config)
            .finish()
    }
}

/// Held for the duration of an exclusive read-modify-write cycle.
///
/// Fields drop in declaration order, so the file lock is released before
/// the mutex.
struct ExclusiveGuard<'a> {
    _lock: WriteLock,
    _gate: parking_lot::MutexGuard<'a, ()>,
}
