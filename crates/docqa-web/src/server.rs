//! HTTP server lifecycle

use serde::{Deserialize, Serialize};
use std::future::Future;

use docqa_core::{Error, Result};

use crate::routes::{AppState, router};

/// Bind address for the form server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serve the form until `shutdown` resolves
pub async fn serve<F>(state: AppState, config: &ServerConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| Error::Network(format!("cannot bind {}: {}", bind_addr, e)))?;

    let local = listener.local_addr()?;
    tracing::info!("DocQA form listening on http://{}", local);
    tracing::info!("  GET  /");
    tracing::info!("  POST /");
    tracing::info!("  POST /api/answer");
    tracing::info!("  GET  /health");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("DocQA form stopped");
    Ok(())
}

/// Resolves on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
