//! Transaction core: the single-slot transaction store, the time-boxed
//! transaction entity, and the barrier coordinating transactional versus
//! independent request processing.

pub mod barrier;
pub mod store;
pub mod transaction;

pub use barrier::{IndependentGuard, TransactionBarrier, TransactionalGuard};
pub use store::TransactionStore;
pub use transaction::{Transaction, TransactionId, TransactionState};
