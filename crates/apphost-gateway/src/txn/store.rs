//! Process-wide transaction store.
//!
//! Holds at most one active transaction together with its management unit
//! and idle-timer task. The three are published and cleared together, and
//! only while holding the coordination lock, so every observer sees either
//! a complete active pair or none at all.
//!
//! The idle timer is a spawned task that sleeps until the transaction's
//! expiry and then re-validates `expires_on` under the coordination lock
//! before acting: a keep-alive that raced the wakeup simply moves the
//! deadline, and the task goes back to sleep for the remainder.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use apphost_config::ManagementUnit;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::error::ApiError;
use crate::txn::transaction::{Transaction, TransactionId, TransactionState};

/// The active (transaction, management unit, timer) triple.
struct ActiveTransaction {
    transaction: Transaction,
    unit: Arc<ManagementUnit>,
    timer: JoinHandle<()>,
}

/// Process-wide arbiter of the single active transaction.
pub struct TransactionStore {
    /// Coordination lock guarding the active triple
    slot: Mutex<Option<ActiveTransaction>>,
    /// Idle window; resets on every keep-alive
    idle_timeout: Duration,
}

impl TransactionStore {
    /// Create a store with the given idle window.
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            idle_timeout,
        }
    }

    /// The configured idle window.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Begin a new transaction bound to a fresh management unit over the
    /// store at `store_path`.
    ///
    /// # Errors
    ///
    /// [`ApiError::TransactionAlreadyActive`] when the slot is occupied;
    /// store-open failures propagate as their API mapping.
    pub fn begin(self: &Arc<Self>, store_path: &Path) -> Result<Transaction, ApiError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(ApiError::TransactionAlreadyActive);
        }

        let unit = Arc::new(ManagementUnit::open(store_path)?);
        let transaction = Transaction::begin(self.idle_timeout);
        let timer = self.spawn_timer(transaction.id.clone());

        info!(
            id = %transaction.id,
            expires_on = %transaction.expires_on,
            "transaction started"
        );
        *slot = Some(ActiveTransaction {
            transaction: transaction.clone(),
            unit,
            timer,
        });
        Ok(transaction)
    }

    /// Extend the active transaction's idle window.
    ///
    /// Returns `None` when no transaction is active — callers must treat
    /// that as "the transaction no longer exists".
    pub fn keep_alive(&self) -> Option<Transaction> {
        let mut slot = self.slot.lock();
        let active = slot.as_mut()?;
        active.transaction.extend(self.idle_timeout);
        Some(active.transaction.clone())
    }

    /// Validate `id` against the active transaction and, when it matches,
    /// extend the idle window and hand out the shared management unit.
    ///
    /// Validation and keep-alive happen under one hold of the coordination
    /// lock so the timer cannot abort between them.
    pub fn join(&self, id: &TransactionId) -> Option<Arc<ManagementUnit>> {
        let mut slot = self.slot.lock();
        let active = slot.as_mut()?;
        if active.transaction.id != *id {
            return None;
        }
        active.transaction.extend(self.idle_timeout);
        Some(Arc::clone(&active.unit))
    }

    /// Snapshot of the active transaction, if any.
    pub fn active(&self) -> Option<Transaction> {
        self.slot.lock().as_ref().map(|a| a.transaction.clone())
    }

    /// Snapshot of the active transaction when its id matches.
    pub fn find(&self, id: &TransactionId) -> Option<Transaction> {
        self.slot
            .lock()
            .as_ref()
            .filter(|a| a.transaction.id == *id)
            .map(|a| a.transaction.clone())
    }

    /// The active management unit when `id` matches. Does not keep-alive.
    pub fn management_unit(&self, id: &TransactionId) -> Option<Arc<ManagementUnit>> {
        self.slot
            .lock()
            .as_ref()
            .filter(|a| a.transaction.id == *id)
            .map(|a| Arc::clone(&a.unit))
    }

    /// Conclude the transaction successfully.
    ///
    /// Disarms the timer, flushes iff a commit was requested, then clears
    /// the slot. A flush failure aborts instead: the unit is disposed
    /// without persisting and the underlying error propagates.
    pub fn commit(&self, id: &TransactionId) -> Result<Transaction, ApiError> {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(active) if active.transaction.id == *id => {}
            _ => return Err(ApiError::TransactionNotFound),
        }
        // Matched above, so the slot is occupied
        let Some(mut active) = slot.take() else {
            return Err(ApiError::TransactionNotFound);
        };
        active.timer.abort();

        if active.unit.commit_requested() {
            if let Err(e) = active.unit.flush() {
                active.unit.dispose();
                active.transaction.state = TransactionState::Aborted;
                error!(id = %id, error = %e, "transaction flush failed; aborted");
                return Err(ApiError::FlushFailed(e.to_string()));
            }
        }
        active.unit.dispose();
        active.transaction.state = TransactionState::Committed;
        info!(id = %id, "transaction committed");
        Ok(active.transaction)
    }

    /// Conclude the transaction by discarding pending changes.
    pub fn abort(&self, id: &TransactionId) -> Result<Transaction, ApiError> {
        let mut slot = self.slot.lock();
        match slot.as_ref() {
            Some(active) if active.transaction.id == *id => {}
            _ => return Err(ApiError::TransactionNotFound),
        }
        let Some(mut active) = slot.take() else {
            return Err(ApiError::TransactionNotFound);
        };
        active.timer.abort();
        active.unit.dispose();
        active.transaction.state = TransactionState::Aborted;
        info!(id = %id, "transaction aborted; pending changes discarded");
        Ok(active.transaction)
    }

    /// Spawn the idle-timer task for a newly started transaction.
    fn spawn_timer(self: &Arc<Self>, id: TransactionId) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut deadline = Utc::now() + chrono::Duration::from_std(store.idle_timeout)
            .unwrap_or_else(|_| chrono::Duration::hours(1));

        tokio::spawn(async move {
            loop {
                let wait = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                tokio::time::sleep(wait).await;

                // Re-validate under the coordination lock; a keep-alive may
                // have moved the deadline while we slept.
                let mut slot = store.slot.lock();
                match slot.as_ref() {
                    Some(active) if active.transaction.id == id => {
                        if !active.transaction.is_expired(Utc::now()) {
                            deadline = active.transaction.expires_on;
                            drop(slot);
                            continue;
                        }
                    }
                    _ => return,
                }
                if let Some(mut active) = slot.take() {
                    active.unit.dispose();
                    active.transaction.state = TransactionState::TimedOut;
                    warn!(
                        id = %active.transaction.id,
                        state = ?active.transaction.state,
                        "transaction idle window elapsed; discarding uncommitted changes"
                    );
                }
                return;
            }
        })
    }
}
