//! Configuration store handle.
//!
//! A [`ConfigStore`] is a live, single-owner handle to the on-disk host
//! configuration: it loads the document on open, hands out section and
//! entity views, and persists with an atomic temp-file + rename `commit()`.
//! Nothing written through the document is durable until `commit()` runs.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use tracing::{debug, info};

use crate::document::ConfigDocument;
use crate::error::StoreError;
use crate::lock::StoreLock;

/// Counter used to keep temp file names unique within the process.
static COMMIT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Handle to the on-disk host configuration document.
pub struct ConfigStore {
    path: PathBuf,
    document: ConfigDocument,
    _lock: StoreLock,
}

impl ConfigStore {
    /// Open the store at `path`, creating a default document when the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] when the path is invalid or the store is
    /// exclusively locked by another process; I/O and parse errors propagate.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if path.as_os_str().is_empty() || path.file_name().is_none() {
            return Err(StoreError::Unavailable {
                path,
                reason: "store path must name a file".to_string(),
            });
        }

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let lock = StoreLock::acquire(&dir)?;

        let document = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            debug!(path = %path.display(), "store file absent; seeding default document");
            let document = ConfigDocument::default();
            write_document(&path, &document)?;
            document
        };

        Ok(Self {
            path,
            document,
            _lock: lock,
        })
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the document.
    pub fn document(&self) -> &ConfigDocument {
        &self.document
    }

    /// Mutable view of the document. Changes stay in memory until
    /// [`ConfigStore::commit`].
    pub fn document_mut(&mut self) -> &mut ConfigDocument {
        &mut self.document
    }

    /// Mutable view of a section at a scope.
    pub fn get_section(&mut self, scope: &str, name: &str) -> Result<&mut Value, StoreError> {
        self.document.section(scope, name)
    }

    /// Effective value of a section at a scope.
    pub fn read_section(&self, scope: &str, name: &str) -> Result<Value, StoreError> {
        self.document.read_section(scope, name)
    }

    /// Persist the in-memory document to disk atomically.
    ///
    /// The document is serialized to a temp file in the store directory,
    /// synced, then renamed onto the store path, so readers observe either
    /// the old or the new document and never a partial write.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        write_document(&self.path, &self.document)?;
        info!(path = %self.path.display(), "configuration committed");
        Ok(())
    }
}

fn write_document(path: &Path, document: &ConfigDocument) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(document)?;

    let tmp_name = format!(
        "{}.tmp.{}.{}",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string()),
        std::process::id(),
        COMMIT_SEQ.fetch_add(1, Ordering::Relaxed),
    );
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}
