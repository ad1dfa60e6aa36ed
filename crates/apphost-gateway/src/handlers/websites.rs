//! Website controller.

use std::sync::Arc;

use apphost_config::{ManagementUnit, Site, DEFAULT_APP_POOL};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{NewWebsite, WebsitePatch};

/// `GET /api/webserver/websites`
pub async fn list(Extension(unit): Extension<Arc<ManagementUnit>>) -> ApiResult<Json<Vec<Site>>> {
    let sites = unit.with_store(|store| Ok::<_, ApiError>(store.document().sites.clone()))?;
    Ok(Json(sites))
}

/// `GET /api/webserver/websites/{name}`
pub async fn show(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Site>> {
    let site = unit.with_store(|store| {
        store
            .document()
            .site(&name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("website '{name}'")))
    })?;
    Ok(Json(site))
}

/// `POST /api/webserver/websites`
pub async fn create(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Json(body): Json<NewWebsite>,
) -> ApiResult<(StatusCode, Json<Site>)> {
    if body.name.trim().is_empty() {
        return Err(ApiError::InvalidParam("site name cannot be empty".into()));
    }
    if body.name.contains('/') {
        return Err(ApiError::InvalidParam(
            "site name cannot contain '/'".into(),
        ));
    }
    if body.physical_path.trim().is_empty() {
        return Err(ApiError::InvalidParam(
            "physical path cannot be empty".into(),
        ));
    }

    let site = unit.with_store(|store| {
        let doc = store.document_mut();
        if doc.site(&body.name).is_some() {
            return Err(ApiError::AlreadyExists(format!("website '{}'", body.name)));
        }
        let app_pool = body.app_pool.as_deref().unwrap_or(DEFAULT_APP_POOL);
        if doc.app_pool(app_pool).is_none() {
            return Err(ApiError::NotFound(format!("application pool '{app_pool}'")));
        }

        let mut site = Site::new(doc.next_site_id(), &body.name, &body.physical_path, app_pool);
        if let Some(bindings) = body.bindings.clone() {
            if bindings.is_empty() {
                return Err(ApiError::InvalidParam(
                    "a site needs at least one binding".into(),
                ));
            }
            site.bindings = bindings;
        }
        doc.sites.push(site.clone());
        Ok(site)
    })?;

    unit.request_commit();
    Ok((StatusCode::CREATED, Json(site)))
}

/// `PATCH /api/webserver/websites/{name}`
pub async fn update(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(name): Path<String>,
    Json(patch): Json<WebsitePatch>,
) -> ApiResult<Json<Site>> {
    let site = unit.with_store(|store| {
        let site = store
            .document_mut()
            .site_mut(&name)
            .ok_or_else(|| ApiError::NotFound(format!("website '{name}'")))?;
        if let Some(auto_start) = patch.server_auto_start {
            site.server_auto_start = auto_start;
        }
        if let Some(bindings) = patch.bindings.clone() {
            if bindings.is_empty() {
                return Err(ApiError::InvalidParam(
                    "a site needs at least one binding".into(),
                ));
            }
            site.bindings = bindings;
        }
        Ok(site.clone())
    })?;

    unit.request_commit();
    Ok(Json(site))
}

/// `DELETE /api/webserver/websites/{name}`
///
/// Also drops any scoped section overrides rooted at the site so a later
/// site of the same name starts clean.
pub async fn remove(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    unit.with_store(|store| {
        let doc = store.document_mut();
        if !doc.remove_site(&name) {
            return Err(ApiError::NotFound(format!("website '{name}'")));
        }
        let prefix = format!("{name}/");
        doc.locations.retain(|l| {
            !l.path.eq_ignore_ascii_case(&name)
                && !l.path.to_ascii_lowercase().starts_with(&prefix.to_ascii_lowercase())
        });
        Ok::<_, ApiError>(())
    })?;

    unit.request_commit();
    Ok(StatusCode::NO_CONTENT)
}
