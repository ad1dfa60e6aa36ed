//! Transaction lifecycle controller.
//!
//! These routes are exempt from the request-scoping middleware; the
//! transaction store does its own coordination under its slot lock.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{RequestedState, TransactionPatch};
use crate::service::AppState;
use crate::txn::{Transaction, TransactionId};

/// `POST /api/transactions` — begin a transaction.
///
/// Takes the exclusive side of the barrier for the duration of the begin so
/// in-flight independent writes drain first; the transaction's snapshot then
/// reflects everything already flushed.
pub async fn begin(State(state): State<AppState>) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let _guard = state.barrier.enter_transactional().await;
    let txn = state.txn_store.begin(&state.store_path)?;
    Ok((StatusCode::CREATED, Json(txn)))
}

/// `GET /api/transactions` — the active transaction, if any.
pub async fn list(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.txn_store.active().into_iter().collect())
}

/// `GET /api/transactions/{id}` — inspect and keep alive.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let id = TransactionId::from(id);
    // Polling for the transaction counts as activity
    if state.txn_store.join(&id).is_none() {
        return Err(ApiError::TransactionNotFound);
    }
    state
        .txn_store
        .find(&id)
        .map(Json)
        .ok_or(ApiError::TransactionNotFound)
}

/// `PATCH /api/transactions/{id}` — conclude the transaction.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TransactionPatch>,
) -> ApiResult<Json<Transaction>> {
    let id = TransactionId::from(id);
    let txn = match patch.state {
        RequestedState::Committed => state.txn_store.commit(&id)?,
        RequestedState::Aborted => state.txn_store.abort(&id)?,
    };
    Ok(Json(txn))
}
