//! Adaptive Caching Subsystem
//!
//! The smart get/set protocol in front of the remote store:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Smart Cache Facade                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌────────────────┐  ┌────────────────────┐   │
//! │  │   Strategy   │  │     Access     │  │     Cache-Type     │   │
//! │  │   Resolver   │  │    Validator   │  │     Classifier     │   │
//! │  └──────┬───────┘  └───────┬────────┘  └─────────┬──────────┘   │
//! │         └──────────────────┼─────────────────────┘              │
//! │                            │                                    │
//! │                  ┌─────────┴──────────┐                         │
//! │                  │  CacheStore (port) │◄──── Maintenance        │
//! │                  │  remote / memory   │      Scheduler (6h)     │
//! │                  └────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure mode inside this subsystem is absorbed and converted into
//! a benign result: reads degrade to miss, writes to `success: false`. A
//! broken cache degrades to always-compute, it never breaks a feature.
//!
//! # Usage
//!
//! ```ignore
//! use smart_cache_gateway::cache::{CacheKey, CacheReadResult, SmartCache};
//! use smart_cache_gateway::cache::store::MemoryStore;
//! use std::sync::Arc;
//!
//! let cache = SmartCache::new(Arc::new(MemoryStore::new()));
//! let key = CacheKey::new("geo_search").param("tirana").build();
//!
//! match cache.get(&key, "geolocation_search", "eu").await {
//!     CacheReadResult::Hit { data, .. } => serve(data),
//!     CacheReadResult::Miss { strategy } => {
//!         let fresh = compute().await;
//!         cache.set(&key, fresh.clone(), "geolocation_search", "eu").await;
//!         serve(fresh)
//!     }
//!     other => reject(other),
//! }
//! ```

pub mod access;
pub mod classify;
pub mod facade;
pub mod key;
pub mod maintenance;
pub mod metrics;
pub mod store;
pub mod strategy;

// Re-export main types
pub use access::{AccessValidator, Permission, REQUIRED_PERMISSIONS};
pub use classify::CacheType;
pub use facade::SmartCache;
pub use key::{CacheKey, KeyParam};
pub use maintenance::{MaintenanceScheduler, DEFAULT_CLEANUP_INTERVAL};
pub use metrics::{FacadeMetrics, FacadeMetricsSnapshot};
pub use store::{
    CacheStore, CacheStoreRef, CleanupReport, MemoryStore, RemoteStore, RemoteStoreConfig,
    ScalingAction, ScalingReport, StoreLookup, StoreStats, TypeStats,
};
pub use strategy::{CacheStrategy, StrategyResolver, DEFAULT_REGION};

use serde::Serialize;
use serde_json::Value;

// =============================================================================
// Cache Read Result
// =============================================================================

/// Result of a smart cache read
///
/// Consumers must branch on the status and never assume a payload is
/// present except on `Hit`. A transport failure and a true upstream miss
/// both surface as `Miss`: callers rely on miss-then-recompute as the
/// uniform degradation path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CacheReadResult {
    /// Key present; payload attached
    Hit {
        /// The cached payload
        data: Value,
        /// Strategy resolved for this read
        strategy: CacheStrategy,
    },
    /// Key absent, expired, or the store was unreachable
    Miss {
        /// Strategy resolved for this read, usable for the follow-up write
        strategy: CacheStrategy,
    },
    /// The access validator rejected the key/permission pair
    InvalidAccess,
    /// Reserved for programming errors; never produced by the fail-open
    /// paths
    Error,
}

impl CacheReadResult {
    /// Check if this is a hit
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheReadResult::Hit { .. })
    }

    /// Check if this is a miss
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheReadResult::Miss { .. })
    }

    /// Get the payload if this is a hit
    pub fn data(&self) -> Option<&Value> {
        match self {
            CacheReadResult::Hit { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Get the resolved strategy, if one was attached
    pub fn strategy(&self) -> Option<&CacheStrategy> {
        match self {
            CacheReadResult::Hit { strategy, .. } | CacheReadResult::Miss { strategy } => {
                Some(strategy)
            }
            _ => None,
        }
    }
}

// =============================================================================
// Cache Write Result
// =============================================================================

/// Result of a smart cache write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheWriteResult {
    /// Whether the store accepted the write
    pub success: bool,
    /// Strategy the write was performed under
    pub strategy: CacheStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_result_accessors() {
        let hit = CacheReadResult::Hit {
            data: json!({"ok": true}),
            strategy: CacheStrategy::default(),
        };
        assert!(hit.is_hit());
        assert_eq!(hit.data(), Some(&json!({"ok": true})));
        assert!(hit.strategy().is_some());

        let miss = CacheReadResult::Miss {
            strategy: CacheStrategy::default(),
        };
        assert!(miss.is_miss());
        assert_eq!(miss.data(), None);
        assert!(miss.strategy().is_some());

        assert_eq!(CacheReadResult::InvalidAccess.data(), None);
        assert_eq!(CacheReadResult::InvalidAccess.strategy(), None);
    }

    #[test]
    fn test_read_result_wire_statuses() {
        let hit = CacheReadResult::Hit {
            data: json!(1),
            strategy: CacheStrategy::default(),
        };
        let value = serde_json::to_value(&hit).unwrap();
        assert_eq!(value["status"], "hit");
        assert_eq!(value["data"], 1);

        let value = serde_json::to_value(&CacheReadResult::InvalidAccess).unwrap();
        assert_eq!(value, json!({"status": "invalid_access"}));

        let value = serde_json::to_value(&CacheReadResult::Error).unwrap();
        assert_eq!(value, json!({"status": "error"}));
    }

    #[test]
    fn test_write_result_serialization() {
        let result = CacheWriteResult {
            success: false,
            strategy: CacheStrategy::default(),
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["strategy"]["ttl_minutes"], 60);
    }
}
