//! API Server
//!
//! Runs the REST server with a graceful-shutdown lifecycle.

use crate::cache::maintenance::MaintenanceScheduler;
use crate::cache::store::CacheStoreRef;
use crate::cache::SmartCache;
use crate::error::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

use super::rest::RestRouter;

// =============================================================================
// Server Configuration
// =============================================================================

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// REST API bind address
    pub rest_addr: SocketAddr,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self {
            rest_addr: "0.0.0.0:8090".parse().unwrap(),
        }
    }
}

// =============================================================================
// API Server
// =============================================================================

/// REST API server
pub struct ApiServer {
    config: ApiServerConfig,
    cache: Arc<SmartCache>,
    store: CacheStoreRef,
    scheduler: Arc<MaintenanceScheduler>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(
        config: ApiServerConfig,
        cache: Arc<SmartCache>,
        store: CacheStoreRef,
        scheduler: Arc<MaintenanceScheduler>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            cache,
            store,
            scheduler,
            shutdown_tx,
        }
    }

    /// Run the server until shutdown
    pub async fn run(&self) -> Result<()> {
        let router = RestRouter::new(
            self.cache.clone(),
            self.store.clone(),
            self.scheduler.clone(),
        );
        let app = router.build();

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!("REST API listening on {}", self.config.rest_addr);
        let listener = tokio::net::TcpListener::bind(self.config.rest_addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("REST server shutting down");
            })
            .await?;

        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
