//! File-based storage backend for persistent storage.

use crate::backend::{StorageBackend, WriteLock};
use crate::error::StorageResult;
use fs2::FileExt;
use parking_lot::Mutex;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Suffix appended to the document path for the staging file.
const TEMP_SUFFIX: &str = ".tmp";
/// Suffix appended to the document path for the advisory lock file.
const LOCK_SUFFIX: &str = ".lock";

/// A file-based storage backend.
///
/// The whole document lives in one file. Replacing it uses the
/// write-then-rename pattern:
///
/// 1. Write the new bytes to `<path>.tmp`
/// 2. Sync the temporary file to disk
/// 3. Rename `<path>.tmp` onto `<path>`
/// 4. Fsync the parent directory so the rename itself is durable
///
/// Readers therefore observe either the previous document or the new one,
/// never a partially written primary file. A crash before step 3 leaves at
/// most a stale `<path>.tmp` behind.
///
/// Replacements through one backend (and its clones) are serialized, since
/// they share the staging file. Separate processes writing the same path
/// must use [`StorageBackend::lock`].
///
/// # Example
///
/// ```no_run
/// use rollcall_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::new(Path::new("data/db.json"));
/// backend.replace(b"{}").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
    temp_path: PathBuf,
    lock_path: PathBuf,
    publish: Arc<Mutex<()>>,
}

impl FileBackend {
    /// Creates a backend for the document at `path`.
    ///
    /// Nothing is touched on disk until the first write.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            temp_path: with_suffix(path, TEMP_SUFFIX),
            lock_path: with_suffix(path, LOCK_SUFFIX),
            publish: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the path to the document file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of the staging file used during replacement.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Returns the path of the advisory lock file.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Writes `data` to the staging file without publishing it.
    ///
    /// The returned [`StagedWrite`] must be committed to replace the primary
    /// file. Dropping it without committing behaves like a crash between the
    /// write and the rename: the primary file is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the staging
    /// file cannot be written and synced.
    pub fn stage(&self, data: &[u8]) -> StorageResult<StagedWrite> {
        ensure_dir(&self.parent_dir())?;

        let mut file = File::create(&self.temp_path)?;
        file.write_all(data)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);

        Ok(StagedWrite {
            temp_path: self.temp_path.clone(),
            target_path: self.path.clone(),
            dir: self.parent_dir(),
        })
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn replace(&self, data: &[u8]) -> StorageResult<()> {
        // Held from staging until the rename so writers never share the temp file
        let _publish = self.publish.lock();
        self.stage(data)?.commit()
    }

    fn ensure_exists(&self, initial: &[u8]) -> StorageResult<bool> {
        ensure_dir(&self.parent_dir())?;

        // create_new never clobbers a document another writer just published.
        // Readers racing this write see empty content, which reads as `{}`.
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        file.write_all(initial)?;
        file.sync_all()?;
        sync_directory(&self.parent_dir())?;
        tracing::debug!(path = %self.path.display(), "created document file");
        Ok(true)
    }

    fn lock(&self) -> StorageResult<WriteLock> {
        ensure_dir(&self.parent_dir())?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;

        // Blocks until any other holder releases the lock
        file.lock_exclusive()?;
        Ok(WriteLock::from_file(file))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// A replacement that has been written to the staging file but not yet
/// published.
#[derive(Debug)]
#[must_use = "a staged write does nothing until committed"]
pub struct StagedWrite {
    temp_path: PathBuf,
    target_path: PathBuf,
    dir: PathBuf,
}

impl StagedWrite {
    /// Returns the staging file path.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Publishes the staged bytes by renaming the staging file onto the
    /// primary file.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename or the directory sync fails. If the
    /// rename fails the primary file is unchanged.
    pub fn commit(self) -> StorageResult<()> {
        fs::rename(&self.temp_path, &self.target_path)?;
        sync_directory(&self.dir)?;
        Ok(())
    }

    /// Discards the staged bytes and removes the staging file.
    ///
    /// # Errors
    ///
    /// Returns an error if the staging file exists but cannot be removed.
    pub fn abort(self) -> StorageResult<()> {
        match fs::remove_file(&self.temp_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Creates `dir` and its ancestors. Losing a creation race is not an error.
fn ensure_dir(dir: &Path) -> StorageResult<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Syncs a directory so that a rename inside it is durable.
///
/// Windows NTFS journals metadata updates and does not support opening a
/// directory for fsync, so this is a no-op there.
#[cfg(unix)]
fn sync_directory(dir: &Path) -> StorageResult<()> {
    let handle = File::open(dir)?;
    handle.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_directory(_dir: &Path) -> StorageResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn load_missing_is_none() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));

        assert!(backend.load().unwrap().is_none());
        assert!(!backend.path().exists());
    }

    #[test]
    fn replace_and_load() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));

        backend.replace(b"{\"a\": []}").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"{\"a\": []}");

        backend.replace(b"{}").unwrap();
        assert_eq!(backend.load().unwrap().unwrap(), b"{}");
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn replace_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("db.json");
        let backend = FileBackend::new(&path);

        backend.replace(b"{}").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn temp_path_appends_suffix() {
        let backend = FileBackend::new(Path::new("data/db.json"));
        assert_eq!(backend.temp_path(), Path::new("data/db.json.tmp"));
        assert_eq!(backend.lock_path(), Path::new("data/db.json.lock"));
    }

    #[test]
    fn uncommitted_stage_leaves_primary_intact() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));
        backend.replace(b"{\"old\": []}").unwrap();
        let before = fs::read(backend.path()).unwrap();

        let staged = backend.stage(b"{\"new\": []}").unwrap();
        assert!(staged.temp_path().exists());
        drop(staged);

        assert_eq!(fs::read(backend.path()).unwrap(), before);
    }

    #[test]
    fn abort_removes_staging_file() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));

        let staged = backend.stage(b"{}").unwrap();
        staged.abort().unwrap();

        assert!(!backend.temp_path().exists());
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn ensure_exists_only_once() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));

        assert!(backend.ensure_exists(b"{}").unwrap());
        backend.replace(b"{\"kept\": []}").unwrap();
        assert!(!backend.ensure_exists(b"{}").unwrap());
        assert_eq!(backend.load().unwrap().unwrap(), b"{\"kept\": []}");
    }

    #[test]
    fn ensure_exists_never_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("db.json");
        let backend = FileBackend::new(&path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{\"students\": []}").unwrap();

        assert!(!backend.ensure_exists(b"{}").unwrap());
        assert_eq!(backend.load().unwrap().unwrap(), b"{\"students\": []}");

        let fresh = FileBackend::new(&dir.path().join("other").join("db.json"));
        assert!(fresh.ensure_exists(b"{}").unwrap());
        assert_eq!(fresh.load().unwrap().unwrap(), b"{}");
    }

    #[test]
    fn concurrent_replaces_publish_whole_documents() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));

        let documents: Vec<Vec<u8>> = (0..8)
            .map(|i| format!("{{\"writer\": \"{}\"}}", "x".repeat(64 + i * 512)).into_bytes())
            .collect();

        let handles: Vec<_> = documents
            .iter()
            .cloned()
            .map(|doc| {
                let backend = backend.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        backend.replace(&doc).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stored = backend.load().unwrap().unwrap();
        assert!(documents.contains(&stored));
        assert!(!backend.temp_path().exists());
    }

    #[test]
    fn lock_is_held_and_released() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));

        {
            let guard = backend.lock().unwrap();
            assert!(guard.is_held());
            assert!(backend.lock_path().exists());
        }

        // Dropping the first guard released the lock
        let again = backend.lock().unwrap();
        assert!(again.is_held());
    }

    #[test]
    fn location_is_path() {
        let backend = FileBackend::new(Path::new("db.json"));
        assert_eq!(backend.location(), "db.json");
    }

    #[test]
    fn relative_path_without_parent() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(&dir.path().join("db.json"));
        assert_eq!(backend.parent_dir(), dir.path());

        let bare = FileBackend::new(Path::new("db.json"));
        assert_eq!(bare.parent_dir(), PathBuf::from("."));
    }
}
