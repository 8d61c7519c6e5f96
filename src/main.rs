//! Smart Cache Gateway
//!
//! Process entry point: wires the store client, the smart cache facade,
//! the maintenance scheduler, and the REST API into one lifecycle.

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smart_cache_gateway::{
    ApiServer, ApiServerConfig, CacheStoreRef, Error, MaintenanceScheduler, MemoryStore,
    RemoteStore, RemoteStoreConfig, Result, SmartCache,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Smart Cache Gateway - adaptive caching for travel/affiliate search backends
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// REST API bind address
    #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:8090")]
    api_addr: String,

    /// Base URL of the remote store's RPC endpoint
    #[arg(long, env = "STORE_URL", default_value = "http://localhost:54321")]
    store_url: String,

    /// Service key for the remote store
    #[arg(long, env = "STORE_SERVICE_KEY", default_value = "")]
    store_service_key: String,

    /// Region assumed for strategy lookups when a call site supplies none
    #[arg(long, env = "DEFAULT_REGION", default_value = "eu")]
    default_region: String,

    /// Cleanup interval in hours
    #[arg(long, env = "CLEANUP_INTERVAL_HOURS", default_value = "6")]
    cleanup_interval_hours: u64,

    /// Run with an in-process store (no remote service)
    #[arg(long, env = "STANDALONE")]
    standalone: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    info!("Starting Smart Cache Gateway");
    info!("  Version: {}", smart_cache_gateway::VERSION);
    info!("  REST API: {}", args.api_addr);
    info!("  Standalone mode: {}", args.standalone);

    // Create the store client
    let store: CacheStoreRef = if args.standalone {
        info!("Using in-process store");
        Arc::new(MemoryStore::new())
    } else {
        info!("Using remote store at {}", args.store_url);
        Arc::new(RemoteStore::new(RemoteStoreConfig {
            base_url: args.store_url.clone(),
            service_key: args.store_service_key.clone(),
        })?)
    };

    // Create the smart cache facade
    let cache = SmartCache::with_default_region(store.clone(), args.default_region.clone());

    // Start the maintenance scheduler (immediate first pass)
    let scheduler = Arc::new(MaintenanceScheduler::with_period(
        store.clone(),
        Duration::from_secs(args.cleanup_interval_hours * 60 * 60),
    ));
    scheduler.start();

    // Create the API server
    let api_config = ApiServerConfig {
        rest_addr: args
            .api_addr
            .parse()
            .map_err(|e| Error::Configuration(format!("Invalid REST API address: {}", e)))?,
    };
    let api_server = Arc::new(ApiServer::new(
        api_config,
        cache,
        store,
        scheduler.clone(),
    ));

    // Shut down cleanly on ctrl-c
    {
        let api_server = api_server.clone();
        let scheduler = scheduler.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            info!("Shutdown signal received");
            scheduler.stop();
            api_server.shutdown();
        });
    }

    info!("Starting API server");
    api_server.run().await?;

    scheduler.stop();
    info!("Gateway shutdown complete");
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(level.into())
        .add_directive("hyper=warn".parse().unwrap())
        .add_directive("reqwest=warn".parse().unwrap())
        .add_directive("tower=warn".parse().unwrap())
        .add_directive("axum=info".parse().unwrap());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
