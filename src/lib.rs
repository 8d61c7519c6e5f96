//! Smart Cache Gateway
//!
//! Adaptive caching layer for a travel/ads/affiliate search backend. Wraps
//! a managed remote store behind a smart get/set protocol with per-endpoint
//! TTL strategies, access validation, and scheduled maintenance.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Smart Cache Gateway                         │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────────┐  ┌───────────────────────┐  │
//! │  │   REST API   │  │   Smart Cache    │  │     Maintenance       │  │
//! │  │ (stats/clean)│  │     Facade       │  │     Scheduler (6h)    │  │
//! │  └──────┬───────┘  └────────┬─────────┘  └───────────┬───────────┘  │
//! │         │                   │                        │              │
//! │         │     ┌─────────────┼──────────────┐         │              │
//! │         │     │  Strategy │ Access │ Type  │         │              │
//! │         │     │  Resolver │  Gate  │ Class │         │              │
//! │         │     └─────────────┬──────────────┘         │              │
//! │         └───────────────────┼────────────────────────┘              │
//! │                   ┌─────────┴──────────┐                            │
//! │                   │  CacheStore (port) │                            │
//! │                   │  remote  /  memory │                            │
//! │                   └────────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole subsystem is fail-open: a degraded or unreachable store never
//! takes down a feature that can still compute its answer the slow way.
//!
//! # Modules
//!
//! - [`cache`]: the adaptive caching subsystem (facade, strategies, store)
//! - [`api`]: REST surface for stats and cleanup triggering
//! - [`error`]: error types and handling

pub mod api;
pub mod cache;
pub mod error;

// Re-export commonly used types
pub use api::{ApiServer, ApiServerConfig, RestRouter};

pub use cache::{
    AccessValidator, CacheKey, CacheReadResult, CacheStore, CacheStoreRef, CacheStrategy,
    CacheType, CacheWriteResult, CleanupReport, FacadeMetricsSnapshot, MaintenanceScheduler,
    MemoryStore, Permission, RemoteStore, RemoteStoreConfig, ScalingReport, SmartCache,
    StoreLookup, StoreStats, StrategyResolver,
};

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
