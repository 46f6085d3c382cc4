use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{config::ServerConfig, errors::CinderError, services::SecretService};

use super::routes::build_router;

pub async fn start_api_server(
    config: ServerConfig,
    service: Arc<SecretService>,
) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| CinderError::config(format!("Invalid API address: {}", e)))?;

    let router = build_router(service);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| CinderError::transport(format!("Failed to bind API server: {}", e)))?;

    info!(address = %addr, "Starting HTTP API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "API server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| CinderError::transport(format!("API server error: {}", e)))?;

    info!("API server shutdown completed");
    Ok(())
}
