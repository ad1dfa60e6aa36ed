// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Apphost configuration store.
//!
//! This crate owns the file-backed host configuration document (the single
//! source of truth for application pools, websites, and feature sections)
//! and the two handles the admin API works through:
//!
//! - [`ConfigStore`] — a live handle to the on-disk document with section
//!   access and an atomic `commit()`.
//! - [`ManagementUnit`] — the deferred-commit wrapper bound to a request or
//!   a transaction: `request_commit()` records intent, `flush()` is the only
//!   operation that performs a durable write.
//!
//! A shared advisory file lock (`LOCK` next to the store file) is held for
//! the lifetime of every open handle, so an external process holding the
//! store exclusively surfaces as [`StoreError::Unavailable`].

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod document;
pub mod error;
pub mod lock;
pub mod management;
pub mod store;

pub use document::{
    AppPool, Application, Binding, ConfigDocument, Location, OverrideMode, Site, VirtualDirectory,
    DEFAULT_APP_POOL, KNOWN_SECTIONS, SECTION_AUTHENTICATION, SECTION_HTTP_COMPRESSION,
    SECTION_HTTP_LOGGING,
};
pub use error::StoreError;
pub use lock::StoreLock;
pub use management::ManagementUnit;
pub use store::ConfigStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
