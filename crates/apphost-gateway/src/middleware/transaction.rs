//! Transaction request-scoping middleware.
//!
//! Every `/api` request is classified before any controller runs:
//!
//! * carries a `Transaction-Id` header → transactional: take the exclusive
//!   side of the barrier, validate the token against the single active
//!   transaction (extending its idle window), and bind that transaction's
//!   management unit into the request extensions. Nothing is flushed here;
//!   persistence waits for the commit endpoint.
//! * no header, mutating method → independent write: take the shared side of
//!   the barrier, refuse while a transaction is active, bind a fresh
//!   management unit, and flush it after a successful controller response.
//! * no header, read → bind a fresh short-lived unit and discard it after.
//!
//! The transaction endpoints themselves are exempt: a commit request must
//! not queue behind the exclusive barrier its own transaction holds.

use std::path::PathBuf;
use std::sync::Arc;
use std::task::{Context, Poll};

use apphost_config::ManagementUnit;
use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::domain::error::ApiError;
use crate::middleware::TRANSACTION_ID_HEADER;
use crate::txn::{TransactionBarrier, TransactionId, TransactionStore};

/// Shared state the middleware scopes each request against.
#[derive(Clone)]
pub struct TransactionScope {
    pub txn_store: Arc<TransactionStore>,
    pub barrier: TransactionBarrier,
    pub store_path: PathBuf,
}

/// Layer wiring the transaction scope into the service stack.
#[derive(Clone)]
pub struct TransactionLayer {
    scope: TransactionScope,
}

impl TransactionLayer {
    pub fn new(scope: TransactionScope) -> Self {
        Self { scope }
    }
}

impl<S> Layer<S> for TransactionLayer {
    type Service = TransactionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TransactionService {
            inner,
            scope: self.scope.clone(),
        }
    }
}

/// Per-request classification service.
#[derive(Clone)]
pub struct TransactionService<S> {
    inner: S,
    scope: TransactionScope,
}

impl<S> Service<Request<Body>> for TransactionService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();
        let scope = self.scope.clone();

        Box::pin(async move {
            let path = req.uri().path().to_string();
            if !path.starts_with("/api") || is_exempt_path(&path) {
                return inner.call(req).await;
            }

            let header_id = req
                .headers()
                .get(TRANSACTION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(TransactionId::from);

            if let Some(id) = header_id {
                // Transactional: exclusive against every other request.
                let _guard = scope.barrier.enter_transactional().await;
                let Some(unit) = scope.txn_store.join(&id) else {
                    warn!(id = %id, path = %path, "request named a transaction that is not active");
                    return Ok(ApiError::TransactionNotFound.into_response());
                };
                req.extensions_mut().insert(unit);
                return inner.call(req).await;
            }

            if is_mutating(req.method()) {
                // Independent write: shared with other independent requests,
                // but refused outright while a transaction is in progress.
                let _guard = scope.barrier.enter_independent().await;
                if scope.txn_store.active().is_some() {
                    debug!(path = %path, "independent write refused during active transaction");
                    return Ok(ApiError::TransactionInProgress.into_response());
                }

                let unit = match ManagementUnit::open(&scope.store_path) {
                    Ok(unit) => Arc::new(unit),
                    Err(e) => return Ok(ApiError::from(e).into_response()),
                };
                req.extensions_mut().insert(Arc::clone(&unit));

                let result = inner.call(req).await;
                match result {
                    Ok(response) => {
                        if response.status().is_success() {
                            if let Err(e) = unit.flush() {
                                unit.dispose();
                                return Ok(ApiError::FlushFailed(e.to_string()).into_response());
                            }
                        }
                        unit.dispose();
                        Ok(response)
                    }
                    Err(e) => {
                        unit.dispose();
                        Err(e)
                    }
                }
            } else {
                // Independent read: short-lived unit, nothing to persist.
                let unit = match ManagementUnit::open(&scope.store_path) {
                    Ok(unit) => Arc::new(unit),
                    Err(e) => return Ok(ApiError::from(e).into_response()),
                };
                req.extensions_mut().insert(Arc::clone(&unit));
                let result = inner.call(req).await;
                unit.dispose();
                result
            }
        })
    }
}

/// Methods that change the configuration document.
fn is_mutating(method: &Method) -> bool {
    *method == Method::POST
        || *method == Method::PUT
        || *method == Method::PATCH
        || *method == Method::DELETE
}

/// The transaction lifecycle endpoints manage the barrier themselves.
fn is_exempt_path(path: &str) -> bool {
    path == "/api/transactions" || path.starts_with("/api/transactions/")
}
