// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Apphost Admin Gateway - REST management API over the host configuration store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ADMIN GATEWAY                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────┐            │
//! │  │             Middleware Stack                    │            │
//! │  │      CORS → Tracing → TransactionLayer          │            │
//! │  └───────────────────────┬─────────────────────────┘            │
//! │                          │ binds Arc<ManagementUnit>            │
//! │  ┌───────────────────────┴─────────────────────────┐            │
//! │  │  Controllers (transactions, pools, websites,    │            │
//! │  │  applications, virtual dirs, feature sections)  │            │
//! │  └───────────────────────┬─────────────────────────┘            │
//! │                          │                                      │
//! │  ┌───────────────────────┴─────────────────────────┐            │
//! │  │  TransactionStore  ──  TransactionBarrier       │            │
//! │  │  (single active transaction, idle timer)        │            │
//! │  └───────────────────────┬─────────────────────────┘            │
//! └──────────────────────────┼──────────────────────────────────────┘
//!                            │
//!                   apphost-config store
//!                     (apphost.json)
//! ```
//!
//! # Concurrency model
//!
//! At most one transaction is active process-wide. A transaction holds the
//! *exclusive* side of the [`TransactionBarrier`] for each of its requests,
//! so no independent mutation can interleave with its uncommitted state.
//! Independent one-off requests share the barrier with each other and are
//! only serialized against an active transaction. The transaction idles out
//! after a configurable window without keep-alive activity; pending changes
//! are discarded.
//!
//! # Usage
//!
//! ```ignore
//! use apphost_gateway::{AdminService, GatewayConfig};
//!
//! let config = GatewayConfig::default();
//! let service = AdminService::new(config)?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod service;
pub mod txn;

// Re-exports for public API
pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use middleware::{TransactionLayer, TransactionScope, TRANSACTION_ID_HEADER};
pub use service::{AdminService, AppState};
pub use txn::{Transaction, TransactionBarrier, TransactionId, TransactionState, TransactionStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client version string reported by the health endpoint
pub fn server_version() -> String {
    format!("ApphostAdmin/v{}", VERSION)
}
