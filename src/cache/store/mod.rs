//! Cache Store Backends
//!
//! The store port and its implementations: the remote RPC-backed store used
//! in production and an in-process store for standalone mode and tests.

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::{RemoteStore, RemoteStoreConfig};

use crate::cache::classify::CacheType;
use crate::cache::strategy::CacheStrategy;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// Store Result Types
// =============================================================================

/// Result of a store-level lookup
///
/// The store reports only hit or miss; transport failures are either
/// absorbed by the adapter or surfaced as `Err` and degraded to miss by the
/// facade. There is deliberately no third state.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreLookup {
    /// Key present and unexpired; payload attached
    Hit {
        /// The stored payload
        data: Value,
    },
    /// Key absent, expired, or unreadable
    Miss,
}

impl StoreLookup {
    /// Check if this is a hit
    pub fn is_hit(&self) -> bool {
        matches!(self, StoreLookup::Hit { .. })
    }

    /// Get the payload if this is a hit
    pub fn data(&self) -> Option<&Value> {
        match self {
            StoreLookup::Hit { data } => Some(data),
            StoreLookup::Miss => None,
        }
    }
}

/// Per-type breakdown inside [`StoreStats`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeStats {
    /// Entries of this type currently stored
    pub count: u64,
    /// Total read hits recorded against entries of this type
    pub hits: u64,
    /// Mean hits per entry
    pub avg_hits: f64,
}

/// Aggregate counters reported by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total entries currently stored
    pub total_entries: u64,
    /// Total read hits across all entries
    pub total_hits: u64,
    /// Approximate stored payload size in megabytes
    pub total_size_mb: f64,
    /// Hits divided by reads, as reported by the store
    pub hit_rate: f64,
    /// Breakdown keyed by cache type
    #[serde(default)]
    pub by_type: BTreeMap<String, TypeStats>,
}

/// Outcome of one store-side cleanup pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Entries removed in total
    pub total_deleted: u64,
    /// Entries removed because their TTL elapsed
    pub expired_deleted: u64,
    /// Entries removed by the low-priority eviction pass
    pub low_priority_deleted: u64,
    /// When the pass completed, store clock
    pub cleaned_at: DateTime<Utc>,
}

/// One recommended scaling action from the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingAction {
    /// Action identifier (store-defined vocabulary)
    pub action: String,
    /// Human-readable rationale
    #[serde(default)]
    pub reason: String,
}

/// Scaling assessment reported by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalingReport {
    /// Recommended actions, empty when no scaling is needed
    #[serde(default)]
    pub scaling_actions: Vec<ScalingAction>,
}

// =============================================================================
// CacheStore Trait (Port)
// =============================================================================

/// Port for the backing cache store
///
/// Implementations hold no request-scoped state and perform no retries; a
/// failed call is reported once and the caller degrades according to the
/// facade's fail-open policy.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a key
    async fn get(&self, key: &str) -> Result<StoreLookup>;

    /// Store a payload under a key with the given TTL and type
    ///
    /// Returns whether the write was accepted. Last write wins; concurrent
    /// writers for the same key are not coordinated.
    async fn set(
        &self,
        key: &str,
        data: &Value,
        ttl_minutes: u32,
        cache_type: CacheType,
    ) -> Result<bool>;

    /// Aggregate counters for all stored entries
    async fn stats(&self) -> Result<StoreStats>;

    /// Evict expired and low-priority entries
    async fn cleanup(&self) -> Result<CleanupReport>;

    /// Adaptive strategy for an (endpoint, region) pair at a point in time
    async fn strategy_for(
        &self,
        endpoint: &str,
        region: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CacheStrategy>>;

    /// Current scaling assessment
    async fn scaling_needs(&self) -> Result<ScalingReport>;
}

/// Type alias for Arc'd CacheStore
pub type CacheStoreRef = Arc<dyn CacheStore>;

// =============================================================================
// Response Normalization
// =============================================================================

/// Normalize a duck-typed store response into at most one row
///
/// The remote store is inconsistent about result shapes: the same function
/// may return a JSON array of rows, a single object, or null. Every adapter
/// call funnels its response through here so downstream code only ever sees
/// one canonical shape.
pub(crate) fn first_row(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Array(mut rows) => {
            if rows.is_empty() {
                None
            } else {
                Some(rows.remove(0))
            }
        }
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_row_null() {
        assert_eq!(first_row(Value::Null), None);
    }

    #[test]
    fn test_first_row_empty_array() {
        assert_eq!(first_row(json!([])), None);
    }

    #[test]
    fn test_first_row_array_takes_first() {
        let row = first_row(json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(row, json!({"a": 1}));
    }

    #[test]
    fn test_first_row_scalar_object() {
        let row = first_row(json!({"a": 1})).unwrap();
        assert_eq!(row, json!({"a": 1}));
    }

    #[test]
    fn test_lookup_accessors() {
        let hit = StoreLookup::Hit {
            data: json!({"lat": 41.3}),
        };
        assert!(hit.is_hit());
        assert_eq!(hit.data(), Some(&json!({"lat": 41.3})));

        let miss = StoreLookup::Miss;
        assert!(!miss.is_hit());
        assert_eq!(miss.data(), None);
    }

    #[test]
    fn test_stats_zeroed_default() {
        let stats = StoreStats::default();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_hits, 0);
        assert!(stats.by_type.is_empty());
    }
}
