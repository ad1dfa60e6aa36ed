//! Shared fixtures for the end-to-end tests.

use std::path::PathBuf;
use std::time::Duration;

use apphost_config::{ConfigDocument, ConfigStore};
use apphost_gateway::{AdminService, GatewayConfig, TRANSACTION_ID_HEADER};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A router over a fresh temporary store.
pub struct TestServer {
    pub router: Router,
    pub store_path: PathBuf,
    // Held so the store directory outlives the test
    _dir: TempDir,
}

/// Build a server with the default idle window.
pub fn server() -> TestServer {
    server_with_timeout(Duration::from_secs(30))
}

/// Build a server with a caller-chosen transaction idle window.
pub fn server_with_timeout(idle_timeout: Duration) -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");
    let store_path = dir.path().join("apphost.json");

    let mut config = GatewayConfig::default();
    config.store.path = store_path.clone();
    config.transactions.idle_timeout = idle_timeout;

    let service = AdminService::new(config).expect("service");
    TestServer {
        router: service.build_router(),
        store_path,
        _dir: dir,
    }
}

/// Build a server over a store pre-seeded by `seed`.
pub fn seeded_server(seed: impl FnOnce(&mut ConfigDocument)) -> TestServer {
    let server = server();
    {
        let mut store = ConfigStore::open(&server.store_path).expect("open store");
        seed(store.document_mut());
        store.commit().expect("commit seed");
    }
    server
}

/// Fire a request at the router and decode the JSON response body.
pub async fn send(
    server: &TestServer,
    method: Method,
    path: &str,
    transaction: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(id) = transaction {
        builder = builder.header(TRANSACTION_ID_HEADER, id);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = server
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

/// Begin a transaction and return its id.
pub async fn begin_transaction(server: &TestServer) -> String {
    let (status, body) = send(server, Method::POST, "/api/transactions", None, None).await;
    assert_eq!(status, StatusCode::CREATED, "begin failed: {body}");
    body["id"].as_str().expect("transaction id").to_string()
}

/// The document as currently persisted on disk.
pub fn on_disk(server: &TestServer) -> ConfigDocument {
    ConfigStore::open(&server.store_path)
        .expect("open store")
        .document()
        .clone()
}
