//! Admin API error taxonomy with REST status mapping.

use apphost_config::StoreError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced to API callers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A transaction is already active; only one may exist at a time.
    #[error("a transaction is already active")]
    TransactionAlreadyActive,

    /// The supplied transaction id does not match an active transaction.
    #[error("transaction not found")]
    TransactionNotFound,

    /// An independent write arrived while a transaction holds the store.
    #[error("a transaction is in progress; retry when it concludes")]
    TransactionInProgress,

    /// The configuration section is administratively locked at this scope.
    #[error("section '{section}' is locked at scope '{scope}'")]
    SectionLocked {
        /// Section name
        section: String,
        /// Scope of the rejected write
        scope: String,
    },

    /// The target scope does not resolve to a site or application.
    #[error("configuration scope not found: '{0}'")]
    ScopeNotFound(String),

    /// A named resource does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// A resource with the same key already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The request payload or parameters are invalid.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// The configuration store could not be opened.
    #[error("configuration store unavailable: {0}")]
    StoreUnavailable(String),

    /// Persisting pending changes failed; the scope was aborted.
    #[error("failed to persist configuration: {0}")]
    FlushFailed(String),

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TransactionAlreadyActive
            | Self::TransactionInProgress
            | Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::TransactionNotFound | Self::ScopeNotFound(_) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::SectionLocked { .. } => StatusCode::LOCKED,
            Self::InvalidParam(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::FlushFailed(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable title for the problem body.
    pub fn title(&self) -> &'static str {
        match self {
            Self::TransactionAlreadyActive => "transaction_already_active",
            Self::TransactionNotFound => "transaction_not_found",
            Self::TransactionInProgress => "transaction_in_progress",
            Self::SectionLocked { .. } => "section_locked",
            Self::ScopeNotFound(_) => "scope_not_found",
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidParam(_) => "invalid_parameter",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::FlushFailed(_) => "flush_failed",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable { .. } => ApiError::StoreUnavailable(e.to_string()),
            StoreError::ScopeNotFound(scope) => ApiError::ScopeNotFound(scope),
            StoreError::SectionLocked { section, scope } => {
                ApiError::SectionLocked { section, scope }
            }
            StoreError::UnknownSection(name) => {
                ApiError::InvalidParam(format!("unknown section '{name}'"))
            }
            StoreError::Disposed | StoreError::Io(_) | StoreError::Serialize(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "title": self.title(),
            "detail": self.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (service lifecycle, not request handling)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
