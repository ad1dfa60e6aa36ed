//! # Apphost Admin Gateway Test Suite
//!
//! End-to-end tests driving the full router (middleware stack included)
//! against a temporary on-disk configuration store.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Router + store fixtures, request helper
//! └── integration/
//!     ├── transactions.rs   # Transaction lifecycle and isolation
//!     ├── independent.rs    # Independent request auto-commit semantics
//!     └── entities.rs       # Pools, websites, applications, sections
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p apphost-tests
//! cargo test -p apphost-tests integration::transactions::
//! ```

#![allow(dead_code)]

pub mod support;
