//! Feature section controllers: http-compression, authentication,
//! http-logging.
//!
//! All three share the same shape: GET returns the effective section at the
//! requested scope, PATCH shallow-merges the body into the section at that
//! scope. A patch below server scope materializes a location override and is
//! subject to the section's write lock.

use std::sync::Arc;

use apphost_config::{
    ManagementUnit, SECTION_AUTHENTICATION, SECTION_HTTP_COMPRESSION, SECTION_HTTP_LOGGING,
};
use axum::extract::Query;
use axum::{Extension, Json};
use serde_json::Value;

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::ScopeQuery;

fn read(unit: &ManagementUnit, section: &str, query: &ScopeQuery) -> ApiResult<Value> {
    let scope = query.scope.as_deref().unwrap_or_default();
    unit.with_store(|store| Ok(store.read_section(scope, section)?))
}

fn patch(unit: &ManagementUnit, section: &str, query: &ScopeQuery, body: Value) -> ApiResult<Value> {
    let Value::Object(updates) = body else {
        return Err(ApiError::InvalidParam(
            "section patch must be a JSON object".into(),
        ));
    };

    let scope = query.scope.as_deref().unwrap_or_default();
    let updated = unit.with_store(|store| {
        let value = store.get_section(scope, section)?;
        merge_section(value, updates)?;
        Ok::<_, ApiError>(value.clone())
    })?;
    unit.request_commit();
    Ok(updated)
}

/// Shallow merge; keys absent from the current section value are rejected
/// so typos surface instead of silently accumulating.
fn merge_section(
    current: &mut Value,
    updates: serde_json::Map<String, Value>,
) -> Result<(), ApiError> {
    let Value::Object(target) = current else {
        return Err(ApiError::Internal("section value is not an object".into()));
    };
    for (key, _) in updates.iter() {
        if !target.contains_key(key) {
            return Err(ApiError::InvalidParam(format!(
                "unknown section property '{key}'"
            )));
        }
    }
    for (key, value) in updates {
        target.insert(key, value);
    }
    Ok(())
}

/// `GET /api/webserver/http-compression`
pub async fn compression_get(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(read(&unit, SECTION_HTTP_COMPRESSION, &query)?))
}

/// `PATCH /api/webserver/http-compression`
pub async fn compression_patch(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Query(query): Query<ScopeQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(patch(&unit, SECTION_HTTP_COMPRESSION, &query, body)?))
}

/// `GET /api/webserver/authentication`
pub async fn authentication_get(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(read(&unit, SECTION_AUTHENTICATION, &query)?))
}

/// `PATCH /api/webserver/authentication`
pub async fn authentication_patch(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Query(query): Query<ScopeQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(patch(&unit, SECTION_AUTHENTICATION, &query, body)?))
}

/// `GET /api/webserver/http-logging`
pub async fn logging_get(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Json<Value>> {
    Ok(Json(read(&unit, SECTION_HTTP_LOGGING, &query)?))
}

/// `PATCH /api/webserver/http-logging`
pub async fn logging_patch(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Query(query): Query<ScopeQuery>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Value>> {
    Ok(Json(patch(&unit, SECTION_HTTP_LOGGING, &query, body)?))
}
