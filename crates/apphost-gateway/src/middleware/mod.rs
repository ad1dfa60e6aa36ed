//! Request-scoping middleware stack.
//!
//! The transaction middleware is the heart of the admin surface: it decides
//! per request whether processing is transactional or independent, holds the
//! matching side of the [`TransactionBarrier`](crate::txn::TransactionBarrier)
//! for the request's whole lifetime, and binds the management unit the
//! controllers operate on.

pub mod cors;
pub mod tracing;
pub mod transaction;

pub use cors::create_cors_layer;
pub use tracing::TracingLayer;
pub use transaction::{TransactionLayer, TransactionScope};

/// Header carrying the transaction token on every transactional request.
pub const TRANSACTION_ID_HEADER: &str = "Transaction-Id";
