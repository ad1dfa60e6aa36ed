//! Transaction barrier: the named coordination primitive between
//! transactional and independent request processing.
//!
//! The underlying primitive is a reader/writer lock with deliberately
//! inverted vocabulary. Independent one-off requests take the *shared* side
//! (`enter_independent`) because they are safe to run concurrently with each
//! other; a transaction takes the *exclusive* side (`enter_transactional`)
//! for each of its requests because it is one logical writer spanning many
//! requests and must never interleave with any other request processing.

use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Coordination barrier between transactional and independent requests.
#[derive(Clone, Default)]
pub struct TransactionBarrier {
    lock: Arc<RwLock<()>>,
}

/// Shared-side guard held by an independent request.
#[must_use = "the barrier is only held while the guard lives"]
pub struct IndependentGuard(#[allow(dead_code)] OwnedRwLockReadGuard<()>);

/// Exclusive-side guard held by a transactional request.
#[must_use = "the barrier is only held while the guard lives"]
pub struct TransactionalGuard(#[allow(dead_code)] OwnedRwLockWriteGuard<()>);

impl TransactionBarrier {
    /// Create an open barrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter as an independent request: shared with other independent
    /// requests, excluded while any transactional request is inside.
    pub async fn enter_independent(&self) -> IndependentGuard {
        IndependentGuard(Arc::clone(&self.lock).read_owned().await)
    }

    /// Enter as a transactional request: exclusive against all other
    /// request processing.
    pub async fn enter_transactional(&self) -> TransactionalGuard {
        TransactionalGuard(Arc::clone(&self.lock).write_owned().await)
    }
}
