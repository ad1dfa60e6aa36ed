//! Application controller, nested under a website.

use std::sync::Arc;

use apphost_config::{Application, ManagementUnit, DEFAULT_APP_POOL};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::NewApplication;

/// `GET /api/webserver/websites/{name}/applications`
pub async fn list(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(site): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    let apps = unit.with_store(|store| {
        store
            .document()
            .site(&site)
            .map(|s| s.applications.clone())
            .ok_or_else(|| ApiError::NotFound(format!("website '{site}'")))
    })?;
    Ok(Json(apps))
}

/// `POST /api/webserver/websites/{name}/applications`
pub async fn create(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(site): Path<String>,
    Json(body): Json<NewApplication>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    if !body.path.starts_with('/') || body.path == "/" {
        return Err(ApiError::InvalidParam(
            "application path must start with '/' and cannot be the root".into(),
        ));
    }
    if body.physical_path.trim().is_empty() {
        return Err(ApiError::InvalidParam(
            "physical path cannot be empty".into(),
        ));
    }

    let app = unit.with_store(|store| {
        let doc = store.document_mut();
        let app_pool = body.app_pool.as_deref().unwrap_or(DEFAULT_APP_POOL);
        if doc.app_pool(app_pool).is_none() {
            return Err(ApiError::NotFound(format!("application pool '{app_pool}'")));
        }
        let site = doc
            .site_mut(&site)
            .ok_or_else(|| ApiError::NotFound(format!("website '{site}'")))?;
        if site.application(&body.path).is_some() {
            return Err(ApiError::AlreadyExists(format!(
                "application '{}'",
                body.path
            )));
        }
        let app = Application::new(&body.path, app_pool, &body.physical_path);
        site.applications.push(app.clone());
        Ok(app)
    })?;

    unit.request_commit();
    Ok((StatusCode::CREATED, Json(app)))
}

/// `DELETE /api/webserver/websites/{name}/applications/{*path}`
pub async fn remove(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path((site, path)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    // Wildcard captures arrive without the leading slash
    let app_path = format!("/{path}");
    if app_path == "/" {
        return Err(ApiError::InvalidParam(
            "the root application cannot be deleted".into(),
        ));
    }

    unit.with_store(|store| {
        let doc = store.document_mut();
        let site_ref = doc
            .site_mut(&site)
            .ok_or_else(|| ApiError::NotFound(format!("website '{site}'")))?;
        let before = site_ref.applications.len();
        site_ref
            .applications
            .retain(|a| !a.path.eq_ignore_ascii_case(&app_path));
        if site_ref.applications.len() == before {
            return Err(ApiError::NotFound(format!("application '{app_path}'")));
        }
        // Drop the matching scoped overrides as well
        let scope = format!("{site}{app_path}");
        doc.locations.retain(|l| !l.path.eq_ignore_ascii_case(&scope));
        Ok::<_, ApiError>(())
    })?;

    unit.request_commit();
    Ok(StatusCode::NO_CONTENT)
}
