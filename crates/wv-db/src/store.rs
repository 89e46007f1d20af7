//! File-backed record store.
//!
//! The whole [`Document`] lives in memory behind a single `RwLock` and is
//! rewritten to disk after every mutation. Writers hold the lock across
//! mutate -> serialize -> write, so concurrent requests can never lose each
//! other's updates. There is no file locking: one process owns the file.

use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use metrics::counter;
use tokio::{fs, sync::RwLock};

use crate::{
    error::{StoreError, StoreResult},
    models::Document,
};

/// What [`RecordStore::load`] found on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document was read and parsed
    Loaded,
    /// No file yet; the snapshot was reset to empty
    Missing,
    /// The file was unreadable or malformed; the snapshot was reset to empty
    Corrupt,
}

/// Handle to the flat-file database.
///
/// Cheap to clone; all clones share the same snapshot. The only way to get
/// one is [`RecordStore::initialize`], so every operation runs against an
/// initialized store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: Arc<PathBuf>,
    pub(crate) data: Arc<RwLock<Document>>,
}

impl RecordStore {
    /// Open the database at `path`.
    ///
    /// Creates the parent directory, then loads the document. A missing or
    /// malformed file degrades to an empty store, which is written back
    /// immediately. Never fails: problems are logged and the store starts
    /// empty.
    pub async fn initialize(path: impl Into<PathBuf>) -> Self {
        let store = Self {
            path: Arc::new(path.into()),
            data: Arc::new(RwLock::new(Document::default())),
        };

        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent).await {
                tracing::error!(
                    path = %parent.display(),
                    "Failed to create database directory: {e}"
                );
            }
        }

        match store.load().await {
            LoadOutcome::Loaded => {
                tracing::info!(path = %store.path.display(), "Database loaded");
            }
            LoadOutcome::Missing | LoadOutcome::Corrupt => {
                tracing::info!(path = %store.path.display(), "Creating new database file");
                // Already logged inside save()
                let _ = store.save().await;
            }
        }

        store
    }

    /// Location of the document on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory snapshot with the document on disk.
    ///
    /// Never fails: a missing or malformed file resets the snapshot to empty
    /// collections.
    pub async fn load(&self) -> LoadOutcome {
        let mut data = self.data.write().await;

        let (document, outcome) = match fs::read(self.path.as_path()).await {
            Ok(bytes) => match serde_json::from_slice::<Document>(&bytes) {
                Ok(document) => (document, LoadOutcome::Loaded),
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        "Malformed database file, starting empty: {e}"
                    );
                    (Document::default(), LoadOutcome::Corrupt)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                (Document::default(), LoadOutcome::Missing)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Unreadable database file, starting empty: {e}"
                );
                (Document::default(), LoadOutcome::Corrupt)
            }
        };

        *data = document;
        outcome
    }

    /// Write the current snapshot to disk.
    ///
    /// Failures are logged and returned; the in-memory snapshot is left as is.
    pub async fn save(&self) -> StoreResult<()> {
        // Write lock so two saves never interleave on the temp file
        let data = self.data.write().await;
        self.persist(&*data).await
    }

    /// Clone of the current in-memory document
    pub async fn snapshot(&self) -> Document {
        self.data.read().await.clone()
    }

    /// Run `f` against the snapshot under the read lock
    pub(crate) async fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        let data = self.data.read().await;
        f(&*data)
    }

    /// Apply `f` under the write lock and persist if it succeeds
    pub(crate) async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Document) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut data = self.data.write().await;
        let value = f(&mut *data)?;
        self.persist(&*data).await?;
        Ok(value)
    }

    /// Like [`Self::mutate`], but nothing is written when `f` finds no record
    pub(crate) async fn mutate_existing<T>(
        &self,
        f: impl FnOnce(&mut Document) -> StoreResult<Option<T>>,
    ) -> StoreResult<Option<T>> {
        let mut data = self.data.write().await;
        let Some(value) = f(&mut *data)? else {
            return Ok(None);
        };
        self.persist(&*data).await?;
        Ok(Some(value))
    }

    async fn persist(&self, document: &Document) -> StoreResult<()> {
        let result = self.write_document(document).await;

        match &result {
            Ok(()) => {
                counter!("store_saves_total", "status" => "success").increment(1);
            }
            Err(e) => {
                counter!("store_saves_total", "status" => "error").increment(1);
                tracing::error!(path = %self.path.display(), "Database save error: {e}");
            }
        }

        result
    }

    /// Whole-document rewrite through a sibling temp file and a rename
    async fn write_document(&self, document: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(document)?;

        let mut tmp = OsString::from(self.path.as_os_str());
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, self.path.as_path()).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_initialize_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("db.json");

        let store = RecordStore::initialize(&path).await;

        assert_eq!(store.path(), path.as_path());
        assert!(path.exists(), "Database file should be created");
    }

    #[tokio::test]
    async fn test_load_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = RecordStore::initialize(&path).await;

        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(store.load().await, LoadOutcome::Corrupt);
        assert_eq!(store.snapshot().await, Document::default());
    }

    #[tokio::test]
    async fn test_load_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = RecordStore::initialize(&path).await;

        std::fs::remove_file(&path).unwrap();

        assert_eq!(store.load().await, LoadOutcome::Missing);
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = RecordStore::initialize(&path).await;

        store.save().await.expect("Save should succeed");

        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_error_is_returned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = RecordStore::initialize(&path).await;

        // Directory vanished underneath the store
        drop(dir);

        let result = store.save().await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
