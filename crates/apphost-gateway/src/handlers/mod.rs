//! REST controllers.
//!
//! Controllers are deliberately thin: extract, validate, mutate the bound
//! management unit, request a commit. They never persist anything
//! themselves; the middleware (independent requests) or the transaction
//! store (transactional requests) owns the flush.

pub mod app_pools;
pub mod applications;
pub mod features;
pub mod transactions;
pub mod virtual_directories;
pub mod websites;
