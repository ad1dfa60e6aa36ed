//! Virtual directory controller, nested under a website.
//!
//! The owning application is selected with the `?application=` query
//! parameter, defaulting to the site's root application.

use std::sync::Arc;

use apphost_config::{ManagementUnit, VirtualDirectory};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::types::{NewVirtualDirectory, VdirQuery};

/// `GET /api/webserver/websites/{name}/virtual-directories`
pub async fn list(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(site): Path<String>,
    Query(query): Query<VdirQuery>,
) -> ApiResult<Json<Vec<VirtualDirectory>>> {
    let vdirs = unit.with_store(|store| {
        let site_ref = store
            .document()
            .site(&site)
            .ok_or_else(|| ApiError::NotFound(format!("website '{site}'")))?;
        let app = site_ref
            .application(&query.application)
            .ok_or_else(|| ApiError::NotFound(format!("application '{}'", query.application)))?;
        Ok::<_, ApiError>(app.virtual_directories.clone())
    })?;
    Ok(Json(vdirs))
}

/// `POST /api/webserver/websites/{name}/virtual-directories`
pub async fn create(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(site): Path<String>,
    Json(body): Json<NewVirtualDirectory>,
) -> ApiResult<(StatusCode, Json<VirtualDirectory>)> {
    if !body.path.starts_with('/') {
        return Err(ApiError::InvalidParam(
            "virtual directory path must start with '/'".into(),
        ));
    }
    if body.physical_path.trim().is_empty() {
        return Err(ApiError::InvalidParam(
            "physical path cannot be empty".into(),
        ));
    }

    let vdir = unit.with_store(|store| {
        let site_ref = store
            .document_mut()
            .site_mut(&site)
            .ok_or_else(|| ApiError::NotFound(format!("website '{site}'")))?;
        let app = site_ref
            .application_mut(&body.application)
            .ok_or_else(|| ApiError::NotFound(format!("application '{}'", body.application)))?;
        if app
            .virtual_directories
            .iter()
            .any(|v| v.path.eq_ignore_ascii_case(&body.path))
        {
            return Err(ApiError::AlreadyExists(format!(
                "virtual directory '{}'",
                body.path
            )));
        }
        let vdir = VirtualDirectory {
            path: body.path.clone(),
            physical_path: body.physical_path.clone(),
        };
        app.virtual_directories.push(vdir.clone());
        Ok(vdir)
    })?;

    unit.request_commit();
    Ok((StatusCode::CREATED, Json(vdir)))
}

/// `DELETE /api/webserver/websites/{name}/virtual-directories?application=&path=`
pub async fn remove(
    Extension(unit): Extension<Arc<ManagementUnit>>,
    Path(site): Path<String>,
    Query(query): Query<VdirQuery>,
) -> ApiResult<StatusCode> {
    let Some(path) = query.path else {
        return Err(ApiError::InvalidParam(
            "the 'path' query parameter is required".into(),
        ));
    };
    if path == "/" {
        return Err(ApiError::InvalidParam(
            "the root virtual directory cannot be deleted".into(),
        ));
    }

    unit.with_store(|store| {
        let site_ref = store
            .document_mut()
            .site_mut(&site)
            .ok_or_else(|| ApiError::NotFound(format!("website '{site}'")))?;
        let app = site_ref
            .application_mut(&query.application)
            .ok_or_else(|| ApiError::NotFound(format!("application '{}'", query.application)))?;
        let before = app.virtual_directories.len();
        app.virtual_directories
            .retain(|v| !v.path.eq_ignore_ascii_case(&path));
        if app.virtual_directories.len() == before {
            return Err(ApiError::NotFound(format!("virtual directory '{path}'")));
        }
        Ok::<_, ApiError>(())
    })?;

    unit.request_commit();
    Ok(StatusCode::NO_CONTENT)
}
