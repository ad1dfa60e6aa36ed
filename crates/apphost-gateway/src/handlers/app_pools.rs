//! Application pool controller.

use std::sync::Arc;

use apphost_config::{AppPool, ManagementUnit, DEFAULT_APP_POOL};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{AppPoolPatch, NewAppPool};

/// `GET /api/webserver/application-pools`
pub async fn list(
    Extension(unit): Extension<Arc<ManagementUnit>>,
) -> ApiResult<Json<Vec<AppPool>>> {
    let pools = unit.with_store(|store| Ok::<_, ApiError>(store.document().app_pools.clone()))?;
    Ok(Json(pools))
}

/// `GET /api/webserver/application-pools/{name}`
pub async fn show(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(name): Path<String>,
) -> ApiResult<Json<AppPool>> {
    let pool = unit.with_store(|store| {
        store
            .document()
            .app_pool(&name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("application pool '{name}'")))
    })?;
    Ok(Json(pool))
}

/// `POST /api/webserver/application-pools`
pub async fn create(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Json(body): Json<NewAppPool>,
) -> ApiResult<(StatusCode, Json<AppPool>)> {
    if body.name.trim().is_empty() {
        return Err(ApiError::InvalidParam("pool name cannot be empty".into()));
    }

    let pool = unit.with_store(|store| {
        let doc = store.document_mut();
        if doc.app_pool(&body.name).is_some() {
            return Err(ApiError::AlreadyExists(format!(
                "application pool '{}'",
                body.name
            )));
        }
        let mut pool = AppPool::new(body.name.clone());
        if let Some(auto_start) = body.auto_start {
            pool.auto_start = auto_start;
        }
        if let Some(queue_length) = body.queue_length {
            pool.queue_length = queue_length;
        }
        if let Some(idle) = body.idle_timeout_secs {
            pool.idle_timeout_secs = idle;
        }
        doc.app_pools.push(pool.clone());
        Ok(pool)
    })?;

    unit.request_commit();
    Ok((StatusCode::CREATED, Json(pool)))
}

/// `PATCH /api/webserver/application-pools/{name}`
pub async fn update(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(name): Path<String>,
    Json(patch): Json<AppPoolPatch>,
) -> ApiResult<Json<AppPool>> {
    let pool = unit.with_store(|store| {
        let pool = store
            .document_mut()
            .app_pool_mut(&name)
            .ok_or_else(|| ApiError::NotFound(format!("application pool '{name}'")))?;
        if let Some(auto_start) = patch.auto_start {
            pool.auto_start = auto_start;
        }
        if let Some(queue_length) = patch.queue_length {
            pool.queue_length = queue_length;
        }
        if let Some(idle) = patch.idle_timeout_secs {
            pool.idle_timeout_secs = idle;
        }
        Ok::<_, ApiError>(pool.clone())
    })?;

    unit.request_commit();
    Ok(Json(pool))
}

/// `DELETE /api/webserver/application-pools/{name}`
pub async fn remove(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    unit.with_store(|store| {
        let doc = store.document_mut();
        if name.eq_ignore_ascii_case(DEFAULT_APP_POOL) {
            return Err(ApiError::InvalidParam(
                "the default application pool cannot be deleted".into(),
            ));
        }
        let referenced = doc.sites.iter().any(|site| {
            site.applications
                .iter()
                .any(|app| app.app_pool.eq_ignore_ascii_case(&name))
        });
        if referenced {
            return Err(ApiError::InvalidParam(format!(
                "application pool '{name}' is still assigned to an application"
            )));
        }
        if !doc.remove_app_pool(&name) {
            return Err(ApiError::NotFound(format!("application pool '{name}'")));
        }
        Ok(())
    })?;

    unit.request_commit();
    Ok(StatusCode::NO_CONTENT)
}
