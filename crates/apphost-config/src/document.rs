//! Host configuration document model.
//!
//! The document is the deserialized form of `apphost.json`: typed
//! collections for application pools and websites, plus named JSON feature
//! sections with per-scope `locations` overrides and write locks.
//!
//! Scope strings address the configuration hierarchy:
//! - `""` — server scope (section defaults)
//! - `"SiteName"` — a website
//! - `"SiteName/app"` — an application inside a website
//!
//! A scope must resolve to an existing site/application; writes to a section
//! whose lock mode is `deny` are rejected below server scope.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::StoreError;

/// HTTP compression feature section
pub const SECTION_HTTP_COMPRESSION: &str = "web/http-compression";
/// Authentication feature section
pub const SECTION_AUTHENTICATION: &str = "web/authentication";
/// Request logging feature section
pub const SECTION_HTTP_LOGGING: &str = "web/http-logging";

/// Sections every document carries defaults for.
pub const KNOWN_SECTIONS: &[&str] = &[
    SECTION_HTTP_COMPRESSION,
    SECTION_AUTHENTICATION,
    SECTION_HTTP_LOGGING,
];

/// Default application pool assigned when a site does not name one.
pub const DEFAULT_APP_POOL: &str = "default";

/// Server-level default value for a known section.
pub fn default_section(name: &str) -> Value {
    match name {
        SECTION_HTTP_COMPRESSION => json!({
            "static_enabled": true,
            "dynamic_enabled": true,
            "directory": "compression",
            "min_file_size_bytes": 2048,
        }),
        SECTION_AUTHENTICATION => json!({
            "anonymous_enabled": true,
            "basic_enabled": false,
            "windows_enabled": false,
        }),
        SECTION_HTTP_LOGGING => json!({
            "enabled": true,
            "directory": "logs",
            "format": "w3c",
            "rollover_size_bytes": 16_777_216,
        }),
        _ => json!({}),
    }
}

/// Write-lock mode for a section below server scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    /// Scopes may override the section
    Allow,
    /// The section is locked at server scope
    Deny,
}

/// A worker process pool serving one or more applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppPool {
    pub name: String,
    pub auto_start: bool,
    pub queue_length: u32,
    pub idle_timeout_secs: u64,
}

impl Default for AppPool {
    fn default() -> Self {
        Self {
            name: String::new(),
            auto_start: true,
            queue_length: 1000,
            idle_timeout_secs: 1200,
        }
    }
}

impl AppPool {
    /// Create a pool with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A listen binding for a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Binding {
    pub protocol: String,
    pub address: String,
}

impl Default for Binding {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            address: "*:80".to_string(),
        }
    }
}

/// A virtual directory mapping a URL path to a physical path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualDirectory {
    pub path: String,
    pub physical_path: String,
}

/// An application rooted at a path inside a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub path: String,
    pub app_pool: String,
    #[serde(default)]
    pub virtual_directories: Vec<VirtualDirectory>,
}

impl Application {
    /// Create an application with its root virtual directory.
    pub fn new(
        path: impl Into<String>,
        app_pool: impl Into<String>,
        physical_path: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            app_pool: app_pool.into(),
            virtual_directories: vec![VirtualDirectory {
                path: "/".to_string(),
                physical_path: physical_path.into(),
            }],
        }
    }
}

/// A website: bindings plus a tree of applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_true")]
    pub server_auto_start: bool,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(default)]
    pub applications: Vec<Application>,
}

fn default_true() -> bool {
    true
}

impl Site {
    /// Create a site with a root application at `/`.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        physical_path: impl Into<String>,
        app_pool: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            server_auto_start: true,
            bindings: vec![Binding::default()],
            applications: vec![Application::new("/", app_pool, physical_path)],
        }
    }

    /// Find an application by its path (case-insensitive).
    pub fn application(&self, path: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|a| a.path.eq_ignore_ascii_case(path))
    }

    /// Find an application by its path, mutably.
    pub fn application_mut(&mut self, path: &str) -> Option<&mut Application> {
        self.applications
            .iter_mut()
            .find(|a| a.path.eq_ignore_ascii_case(path))
    }
}

/// A per-scope section override block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Scope path the overrides apply to (`"Site"` or `"Site/app"`)
    pub path: String,
    /// Section name → overridden section value
    #[serde(default)]
    pub sections: BTreeMap<String, Value>,
}

/// The whole host configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    pub app_pools: Vec<AppPool>,
    pub sites: Vec<Site>,
    /// Server-scope section values
    pub sections: BTreeMap<String, Value>,
    /// Scope overrides
    pub locations: Vec<Location>,
    /// Section write locks
    pub section_locks: BTreeMap<String, OverrideMode>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        let sections = KNOWN_SECTIONS
            .iter()
            .map(|name| (name.to_string(), default_section(name)))
            .collect();
        Self {
            app_pools: vec![AppPool::new(DEFAULT_APP_POOL)],
            sites: Vec::new(),
            sections,
            locations: Vec::new(),
            section_locks: BTreeMap::new(),
        }
    }
}

impl ConfigDocument {
    /// Find an application pool by name (case-insensitive).
    pub fn app_pool(&self, name: &str) -> Option<&AppPool> {
        self.app_pools
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Find an application pool by name, mutably.
    pub fn app_pool_mut(&mut self, name: &str) -> Option<&mut AppPool> {
        self.app_pools
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Remove an application pool; returns whether it existed.
    pub fn remove_app_pool(&mut self, name: &str) -> bool {
        let before = self.app_pools.len();
        self.app_pools.retain(|p| !p.name.eq_ignore_ascii_case(name));
        self.app_pools.len() != before
    }

    /// Find a site by name (case-insensitive).
    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Find a site by name, mutably.
    pub fn site_mut(&mut self, name: &str) -> Option<&mut Site> {
        self.sites
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Remove a site; returns whether it existed.
    pub fn remove_site(&mut self, name: &str) -> bool {
        let before = self.sites.len();
        self.sites.retain(|s| !s.name.eq_ignore_ascii_case(name));
        self.sites.len() != before
    }

    /// Next unused site id.
    pub fn next_site_id(&self) -> u32 {
        self.sites.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    fn is_known_section(&self, name: &str) -> bool {
        KNOWN_SECTIONS.contains(&name) || self.sections.contains_key(name)
    }

    /// Validate that a scope string resolves to an existing site/application.
    pub fn resolve_scope(&self, scope: &str) -> Result<(), StoreError> {
        if scope.is_empty() {
            return Ok(());
        }
        let mut parts = scope.splitn(2, '/');
        let site_name = parts.next().unwrap_or_default();
        let site = self
            .site(site_name)
            .ok_or_else(|| StoreError::ScopeNotFound(scope.to_string()))?;
        if let Some(rest) = parts.next() {
            let app_path = format!("/{rest}");
            if site.application(&app_path).is_none() {
                return Err(StoreError::ScopeNotFound(scope.to_string()));
            }
        }
        Ok(())
    }

    /// Effective (read-only) value of a section at a scope.
    ///
    /// Overrides apply outermost-first: server defaults, then the site
    /// location, then the application location.
    pub fn read_section(&self, scope: &str, name: &str) -> Result<Value, StoreError> {
        if !self.is_known_section(name) {
            return Err(StoreError::UnknownSection(name.to_string()));
        }
        self.resolve_scope(scope)?;

        let mut value = self
            .sections
            .get(name)
            .cloned()
            .unwrap_or_else(|| default_section(name));
        for prefix in scope_prefixes(scope) {
            if let Some(location) = self
                .locations
                .iter()
                .find(|l| l.path.eq_ignore_ascii_case(&prefix))
            {
                if let Some(overridden) = location.sections.get(name) {
                    value = overridden.clone();
                }
            }
        }
        Ok(value)
    }

    /// Mutable view of a section at a scope.
    ///
    /// Server scope edits the section defaults. A non-server scope
    /// materializes a `locations` override seeded from the current effective
    /// value, unless the section lock mode is `deny`.
    pub fn section(&mut self, scope: &str, name: &str) -> Result<&mut Value, StoreError> {
        if !self.is_known_section(name) {
            return Err(StoreError::UnknownSection(name.to_string()));
        }
        self.resolve_scope(scope)?;

        if scope.is_empty() {
            return Ok(self
                .sections
                .entry(name.to_string())
                .or_insert_with(|| default_section(name)));
        }

        if matches!(self.section_locks.get(name), Some(OverrideMode::Deny)) {
            return Err(StoreError::SectionLocked {
                section: name.to_string(),
                scope: scope.to_string(),
            });
        }

        let seed = self.read_section(scope, name)?;
        let idx = match self
            .locations
            .iter()
            .position(|l| l.path.eq_ignore_ascii_case(scope))
        {
            Some(idx) => idx,
            None => {
                self.locations.push(Location {
                    path: scope.to_string(),
                    sections: BTreeMap::new(),
                });
                self.locations.len() - 1
            }
        };
        Ok(self.locations[idx]
            .sections
            .entry(name.to_string())
            .or_insert(seed))
    }
}

/// Scope prefixes from outermost to innermost: `"a/b"` → `["a", "a/b"]`.
fn scope_prefixes(scope: &str) -> Vec<String> {
    if scope.is_empty() {
        return Vec::new();
    }
    let mut prefixes = Vec::new();
    let mut current = String::new();
    for segment in scope.split('/') {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(segment);
        prefixes.push(current.clone());
    }
    prefixes
}
