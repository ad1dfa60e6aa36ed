//! Admin gateway executable.
//!
//! Loads configuration (defaults overridden from the environment), starts
//! the HTTP admin service, and shuts it down gracefully on Ctrl+C.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use apphost_gateway::{AdminService, GatewayConfig};

/// Load configuration from environment overrides.
fn load_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();

    if let Ok(addr) = std::env::var("APPHOST_ADDR") {
        let mut parts = addr.rsplitn(2, ':');
        let port = parts.next().and_then(|p| p.parse().ok());
        let host = parts.next().and_then(|h| h.parse().ok());
        match (host, port) {
            (Some(host), Some(port)) => {
                config.http.host = host;
                config.http.port = port;
            }
            _ => warn!(addr = %addr, "APPHOST_ADDR must be host:port; ignoring"),
        }
    }

    if let Ok(path) = std::env::var("APPHOST_STORE") {
        config.store.path = path.into();
    }

    if let Ok(secs) = std::env::var("APPHOST_TXN_TIMEOUT_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) if secs > 0 => {
                config.transactions.idle_timeout = std::time::Duration::from_secs(secs);
            }
            _ => warn!(value = %secs, "APPHOST_TXN_TIMEOUT_SECS must be a positive integer; ignoring"),
        }
    }

    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config();
    let service = Arc::new(AdminService::new(config)?);

    let mut server = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.start().await }
    });

    tokio::select! {
        result = &mut server => result??,
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C, shutting down");
            // Drain in-flight requests before exiting
            service.shutdown();
            server.await??;
        }
    }

    Ok(())
}
