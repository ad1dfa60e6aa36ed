//! Advisory locking for the store directory.
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on
//! Windows). Every open store handle holds a *shared* lock on a `LOCK` file
//! next to the store: concurrent handles from this process (or compatible
//! readers) coexist, while an external process holding the lock exclusively
//! makes the store unavailable.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::StoreError;

/// Shared advisory lock on the store directory.
///
/// Released on drop (RAII).
pub struct StoreLock {
    /// The lock file handle (kept open to maintain the lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
}

impl StoreLock {
    /// Lock file name
    const LOCK_FILE: &'static str = "LOCK";

    /// Acquire a shared lock in `store_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the lock file cannot be
    /// created or another process holds the lock exclusively.
    pub fn acquire(store_dir: &Path) -> Result<Self, StoreError> {
        let path = store_dir.join(Self::LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::Unavailable {
                path: path.clone(),
                reason: format!("cannot create lock file: {e}"),
            })?;

        file.try_lock_shared().map_err(|e| StoreError::Unavailable {
            path: path.clone(),
            reason: format!("store is exclusively locked: {e}"),
        })?;

        Ok(Self { file, path })
    }

    /// Path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // Shared lock: release our hold, leave the lock file in place for
        // other handles.
        let _ = self.file.unlock();
    }
}
