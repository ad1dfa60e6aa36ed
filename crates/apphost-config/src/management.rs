//! Management unit: the deferred-commit wrapper around a store handle.
//!
//! Controllers never persist directly. A controller that wants its changes
//! saved calls [`ManagementUnit::request_commit`], which only records
//! intent; the owning scope (the transaction store at transaction
//! conclusion, or the request middleware at the end of an independent
//! request) calls [`ManagementUnit::flush`], the single place a durable
//! write happens. This keeps intent and effect decoupled and unit-testable.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::store::ConfigStore;

/// Single-owner wrapper of a [`ConfigStore`] with a deferred-commit flag.
pub struct ManagementUnit {
    store: Mutex<Option<ConfigStore>>,
    commit_requested: AtomicBool,
}

impl ManagementUnit {
    /// Open a fresh store handle at `path` and wrap it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(ConfigStore::open(path.as_ref())?))
    }

    /// Wrap an already-open store handle.
    pub fn new(store: ConfigStore) -> Self {
        Self {
            store: Mutex::new(Some(store)),
            commit_requested: AtomicBool::new(false),
        }
    }

    /// Record that pending changes should be persisted when the enclosing
    /// scope concludes. Idempotent; purely in-memory.
    pub fn request_commit(&self) {
        self.commit_requested.store(true, Ordering::SeqCst);
    }

    /// Whether a commit has been requested.
    pub fn commit_requested(&self) -> bool {
        self.commit_requested.load(Ordering::SeqCst)
    }

    /// Run `f` against the owned store handle.
    ///
    /// # Errors
    ///
    /// [`StoreError::Disposed`] once the unit has been disposed.
    pub fn with_store<T, E>(&self, f: impl FnOnce(&mut ConfigStore) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut guard = self.store.lock();
        match guard.as_mut() {
            Some(store) => f(store),
            None => Err(E::from(StoreError::Disposed)),
        }
    }

    /// Persist pending changes iff a commit was requested.
    ///
    /// Called only by the owning scope; a flush failure means the scope must
    /// be treated as aborted (the changes were not applied).
    pub fn flush(&self) -> Result<(), StoreError> {
        if !self.commit_requested() {
            debug!("flush skipped; no commit requested");
            return Ok(());
        }
        self.with_store(|store| store.commit())
    }

    /// Release the underlying store handle. Idempotent.
    pub fn dispose(&self) {
        if self.store.lock().take().is_some() {
            debug!("management unit disposed");
        }
    }

    /// Whether the unit has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.store.lock().is_none()
    }
}
