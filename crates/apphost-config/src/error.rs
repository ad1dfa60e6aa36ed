//! Store error types.

use std::path::PathBuf;

/// Errors raised by the configuration store and management unit.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store path is invalid or the store is held exclusively by an
    /// incompatible process.
    #[error("configuration store unavailable at {path}: {reason}")]
    Unavailable {
        /// Path to the store file
        path: PathBuf,
        /// Why the store could not be opened
        reason: String,
    },

    /// The target scope does not resolve to an existing site or application.
    #[error("configuration scope not found: '{0}'")]
    ScopeNotFound(String),

    /// The section is administratively locked for writing below server scope.
    #[error("section '{section}' is locked at scope '{scope}'")]
    SectionLocked {
        /// Section name
        section: String,
        /// Scope at which the write was attempted
        scope: String,
    },

    /// The section name is not part of the known configuration schema.
    #[error("unknown configuration section: '{0}'")]
    UnknownSection(String),

    /// The management unit was disposed; the underlying handle is gone.
    #[error("management unit already disposed")]
    Disposed,

    /// Underlying filesystem failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document (de)serialization failure.
    #[error("store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
