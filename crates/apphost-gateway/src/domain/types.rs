//! Request payload types for the admin surface.
//!
//! Responses reuse the `apphost-config` document types directly; the
//! controllers are translation glue, not a parallel model.

use apphost_config::Binding;
use serde::Deserialize;

/// `PATCH /api/transactions/{id}` body.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TransactionPatch {
    /// Requested terminal state
    pub state: RequestedState,
}

/// The two caller-drivable transaction conclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedState {
    Committed,
    Aborted,
}

/// `POST /api/webserver/application-pools` body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppPool {
    pub name: String,
    #[serde(default)]
    pub auto_start: Option<bool>,
    #[serde(default)]
    pub queue_length: Option<u32>,
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,
}

/// `PATCH /api/webserver/application-pools/{name}` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppPoolPatch {
    pub auto_start: Option<bool>,
    pub queue_length: Option<u32>,
    pub idle_timeout_secs: Option<u64>,
}

/// `POST /api/webserver/websites` body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWebsite {
    pub name: String,
    pub physical_path: String,
    #[serde(default)]
    pub app_pool: Option<String>,
    #[serde(default)]
    pub bindings: Option<Vec<Binding>>,
}

/// `PATCH /api/webserver/websites/{name}` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebsitePatch {
    pub server_auto_start: Option<bool>,
    pub bindings: Option<Vec<Binding>>,
}

/// `POST /api/webserver/websites/{name}/applications` body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApplication {
    /// Application path inside the site, e.g. `/shop`
    pub path: String,
    pub physical_path: String,
    #[serde(default)]
    pub app_pool: Option<String>,
}

/// `POST /api/webserver/websites/{name}/virtual-directories` body.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVirtualDirectory {
    /// Owning application path (defaults to the root application)
    #[serde(default = "default_app_path")]
    pub application: String,
    /// Virtual directory path inside the application, e.g. `/static`
    pub path: String,
    pub physical_path: String,
}

/// Query selector for virtual-directory routes.
#[derive(Debug, Clone, Deserialize)]
pub struct VdirQuery {
    #[serde(default = "default_app_path")]
    pub application: String,
    #[serde(default)]
    pub path: Option<String>,
}

fn default_app_path() -> String {
    "/".to_string()
}

/// Optional `?scope=` selector for feature section routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScopeQuery {
    pub scope: Option<String>,
}
