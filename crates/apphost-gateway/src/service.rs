//! Admin gateway service - main entry point.
//!
//! Builds the router, wires the middleware stack, and runs the HTTP server.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::handlers::{
    app_pools, applications, features, transactions, virtual_directories, websites,
};
use crate::middleware::{create_cors_layer, TracingLayer, TransactionLayer, TransactionScope};
use crate::txn::{TransactionBarrier, TransactionStore};
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub txn_store: Arc<TransactionStore>,
    pub barrier: TransactionBarrier,
    pub store_path: PathBuf,
}

/// Admin gateway service
pub struct AdminService {
    config: GatewayConfig,
    txn_store: Arc<TransactionStore>,
    barrier: TransactionBarrier,
    shutdown_tx: watch::Sender<bool>,
}

impl AdminService {
    /// Create a new admin service
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let txn_store = Arc::new(TransactionStore::new(config.transactions.idle_timeout));
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            config,
            txn_store,
            barrier: TransactionBarrier::new(),
            shutdown_tx,
        })
    }

    /// Start the HTTP server; resolves once a [`shutdown`](Self::shutdown)
    /// has been signalled and in-flight requests have drained.
    pub async fn start(&self) -> Result<(), GatewayError> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let router = self.build_router();
        let addr = self.config.http_addr();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, store = %self.config.store.path.display(), "admin gateway listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                if !*shutdown_rx.borrow() {
                    let _ = shutdown_rx.changed().await;
                }
                info!("shutdown requested");
            })
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        info!("admin gateway stopped");
        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// The process-wide transaction store.
    pub fn txn_store(&self) -> Arc<TransactionStore> {
        Arc::clone(&self.txn_store)
    }

    /// The coordination barrier shared by the middleware and the
    /// transaction controller.
    pub fn barrier(&self) -> TransactionBarrier {
        self.barrier.clone()
    }

    /// Build the full router with middleware stack.
    ///
    /// Public so integration tests can drive the service without a socket.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            txn_store: Arc::clone(&self.txn_store),
            barrier: self.barrier.clone(),
            store_path: self.config.store.path.clone(),
        };
        let scope = TransactionScope {
            txn_store: Arc::clone(&self.txn_store),
            barrier: self.barrier.clone(),
            store_path: self.config.store.path.clone(),
        };

        let middleware = ServiceBuilder::new()
            .layer(create_cors_layer(&self.config.cors))
            .layer(TracingLayer::new())
            .layer(TransactionLayer::new(scope));

        Router::new()
            .route("/health", get(health_check))
            .route(
                "/api/transactions",
                get(transactions::list).post(transactions::begin),
            )
            .route(
                "/api/transactions/:id",
                get(transactions::show).patch(transactions::update),
            )
            .route(
                "/api/webserver/application-pools",
                get(app_pools::list).post(app_pools::create),
            )
            .route(
                "/api/webserver/application-pools/:name",
                get(app_pools::show)
                    .patch(app_pools::update)
                    .delete(app_pools::remove),
            )
            .route(
                "/api/webserver/websites",
                get(websites::list).post(websites::create),
            )
            .route(
                "/api/webserver/websites/:name",
                get(websites::show)
                    .patch(websites::update)
                    .delete(websites::remove),
            )
            .route(
                "/api/webserver/websites/:name/applications",
                get(applications::list).post(applications::create),
            )
            .route(
                "/api/webserver/websites/:name/applications/*path",
                delete(applications::remove),
            )
            .route(
                "/api/webserver/websites/:name/virtual-directories",
                get(virtual_directories::list)
                    .post(virtual_directories::create)
                    .delete(virtual_directories::remove),
            )
            .route(
                "/api/webserver/http-compression",
                get(features::compression_get).patch(features::compression_patch),
            )
            .route(
                "/api/webserver/authentication",
                get(features::authentication_get).patch(features::authentication_patch),
            )
            .route(
                "/api/webserver/http-logging",
                get(features::logging_get).patch(features::logging_patch),
            )
            .layer(middleware)
            .with_state(state)
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "server": crate::server_version(),
        })),
    )
}
