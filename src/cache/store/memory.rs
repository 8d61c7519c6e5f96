//! In-Process Cache Store
//!
//! DashMap-backed implementation of [`CacheStore`] used in standalone mode
//! and as the deterministic store for tests. Mirrors the remote store's
//! observable behavior: TTL expiry on read, hit counting, cleanup passes for
//! expired and low-priority entries, and per-type stats.

use crate::cache::classify::CacheType;
use crate::cache::store::{
    CacheStore, CleanupReport, ScalingAction, ScalingReport, StoreLookup, StoreStats, TypeStats,
};
use crate::cache::strategy::{CacheStrategy, DEFAULT_PRIORITY};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Constants
// =============================================================================

/// Entries at or below this priority are candidates for the low-priority
/// eviction pass once they have gone unread.
const LOW_PRIORITY_EVICTION_MAX: u8 = 1;

/// Entry count above which the store recommends scaling out
const SCALING_ENTRY_THRESHOLD: u64 = 10_000;

// =============================================================================
// Stored Entry
// =============================================================================

/// A single cached row
#[derive(Debug, Clone)]
struct StoredEntry {
    data: Value,
    cache_type: CacheType,
    priority: u8,
    expires_at: DateTime<Utc>,
    hit_count: u64,
}

impl StoredEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    fn approx_size_bytes(&self) -> u64 {
        serde_json::to_string(&self.data)
            .map(|s| s.len() as u64)
            .unwrap_or(0)
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process cache store
pub struct MemoryStore {
    entries: DashMap<String, StoredEntry>,
    strategies: DashMap<(String, String), CacheStrategy>,
    reads: AtomicU64,
    hits: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            strategies: DashMap::new(),
            reads: AtomicU64::new(0),
            hits: AtomicU64::new(0),
        }
    }

    /// Register an adaptive strategy for an (endpoint, region) pair
    pub fn put_strategy(&self, endpoint: &str, region: &str, strategy: CacheStrategy) {
        self.strategies
            .insert((endpoint.to_string(), region.to_string()), strategy);
    }

    /// Current entry count
    pub fn entry_count(&self) -> u64 {
        self.entries.len() as u64
    }

    /// Backdate an entry's expiry so the next read or cleanup treats it as
    /// expired.
    #[cfg(test)]
    pub(crate) fn force_expire(&self, key: &str) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.expires_at = Utc::now() - Duration::minutes(1);
        }
    }

    /// Override an entry's priority.
    #[cfg(test)]
    pub(crate) fn force_priority(&self, key: &str, priority: u8) {
        if let Some(mut entry) = self.entries.get_mut(key) {
            entry.priority = priority;
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<StoreLookup> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();

        // Expired entries read as misses and are dropped eagerly
        let expired = self
            .entries
            .get(key)
            .map(|e| e.is_expired(now))
            .unwrap_or(false);
        if expired {
            self.entries.remove(key);
            return Ok(StoreLookup::Miss);
        }

        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.hit_count += 1;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(StoreLookup::Hit {
                    data: entry.data.clone(),
                })
            }
            None => Ok(StoreLookup::Miss),
        }
    }

    async fn set(
        &self,
        key: &str,
        data: &Value,
        ttl_minutes: u32,
        cache_type: CacheType,
    ) -> Result<bool> {
        let now = Utc::now();
        // Last write wins, matching the remote store's semantics
        self.entries.insert(
            key.to_string(),
            StoredEntry {
                data: data.clone(),
                cache_type,
                priority: DEFAULT_PRIORITY,
                expires_at: now + Duration::minutes(i64::from(ttl_minutes)),
                hit_count: 0,
            },
        );
        Ok(true)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let mut by_type: BTreeMap<String, TypeStats> = BTreeMap::new();
        let mut total_hits = 0u64;
        let mut total_bytes = 0u64;

        for entry in self.entries.iter() {
            let stats = by_type.entry(entry.cache_type.to_string()).or_default();
            stats.count += 1;
            stats.hits += entry.hit_count;
            total_hits += entry.hit_count;
            total_bytes += entry.approx_size_bytes();
        }

        for stats in by_type.values_mut() {
            stats.avg_hits = if stats.count == 0 {
                0.0
            } else {
                stats.hits as f64 / stats.count as f64
            };
        }

        let reads = self.reads.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);

        Ok(StoreStats {
            total_entries: self.entries.len() as u64,
            total_hits,
            total_size_mb: total_bytes as f64 / (1024.0 * 1024.0),
            hit_rate: if reads == 0 {
                0.0
            } else {
                hits as f64 / reads as f64
            },
            by_type,
        })
    }

    async fn cleanup(&self) -> Result<CleanupReport> {
        let now = Utc::now();

        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        for key in &expired {
            self.entries.remove(key);
        }

        // Low-priority pass: unread entries nobody would miss
        let low_priority: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.priority <= LOW_PRIORITY_EVICTION_MAX && e.hit_count == 0)
            .map(|e| e.key().clone())
            .collect();
        for key in &low_priority {
            self.entries.remove(key);
        }

        Ok(CleanupReport {
            total_deleted: (expired.len() + low_priority.len()) as u64,
            expired_deleted: expired.len() as u64,
            low_priority_deleted: low_priority.len() as u64,
            cleaned_at: Utc::now(),
        })
    }

    async fn strategy_for(
        &self,
        endpoint: &str,
        region: &str,
        _at: DateTime<Utc>,
    ) -> Result<Option<CacheStrategy>> {
        Ok(self
            .strategies
            .get(&(endpoint.to_string(), region.to_string()))
            .map(|s| s.clone()))
    }

    async fn scaling_needs(&self) -> Result<ScalingReport> {
        let total = self.entries.len() as u64;
        let mut actions = Vec::new();
        if total > SCALING_ENTRY_THRESHOLD {
            actions.push(ScalingAction {
                action: "increase_cache_capacity".into(),
                reason: format!("{} entries exceed threshold {}", total, SCALING_ENTRY_THRESHOLD),
            });
        }
        Ok(ScalingReport {
            scaling_actions: actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        let payload = json!({"lat": 41.3, "lng": 19.8});

        assert!(store
            .set("geo_search:tirana", &payload, 60, CacheType::Geo)
            .await
            .unwrap());

        let lookup = store.get("geo_search:tirana").await.unwrap();
        assert_eq!(lookup, StoreLookup::Hit { data: payload });
    }

    #[tokio::test]
    async fn test_cached_null_reads_as_hit() {
        let store = MemoryStore::new();
        store
            .set("k", &Value::Null, 60, CacheType::Api)
            .await
            .unwrap();

        let lookup = store.get("k").await.unwrap();
        assert_eq!(lookup, StoreLookup::Hit { data: Value::Null });
    }

    #[tokio::test]
    async fn test_miss_for_unknown_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), StoreLookup::Miss);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = MemoryStore::new();
        store
            .set("k", &json!({"v": 1}), 60, CacheType::Api)
            .await
            .unwrap();
        store
            .set("k", &json!({"v": 2}), 60, CacheType::Api)
            .await
            .unwrap();

        let lookup = store.get("k").await.unwrap();
        assert_eq!(lookup.data(), Some(&json!({"v": 2})));
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss() {
        let store = MemoryStore::new();
        store
            .set("k", &json!({"v": 1}), 60, CacheType::Api)
            .await
            .unwrap();
        store.force_expire("k");

        assert_eq!(store.get("k").await.unwrap(), StoreLookup::Miss);
        // Eagerly dropped
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_evicts_expired_and_low_priority() {
        let store = MemoryStore::new();
        store
            .set("expired", &json!(1), 60, CacheType::Api)
            .await
            .unwrap();
        store
            .set("cold", &json!(2), 60, CacheType::Api)
            .await
            .unwrap();
        store
            .set("kept", &json!(3), 60, CacheType::Api)
            .await
            .unwrap();

        store.force_expire("expired");
        store.force_priority("cold", 1);

        let report = store.cleanup().await.unwrap();
        assert_eq!(report.expired_deleted, 1);
        assert_eq!(report.low_priority_deleted, 1);
        assert_eq!(report.total_deleted, 2);
        assert_eq!(store.entry_count(), 1);
        assert!(store.get("kept").await.unwrap().is_hit());
    }

    #[tokio::test]
    async fn test_low_priority_pass_spares_read_entries() {
        let store = MemoryStore::new();
        store
            .set("warm", &json!(1), 60, CacheType::Api)
            .await
            .unwrap();
        store.force_priority("warm", 0);

        // One read marks the entry as worth keeping
        assert!(store.get("warm").await.unwrap().is_hit());

        let report = store.cleanup().await.unwrap();
        assert_eq!(report.low_priority_deleted, 0);
        assert_eq!(store.entry_count(), 1);
    }

    #[tokio::test]
    async fn test_stats_partitioned_by_type() {
        let store = MemoryStore::new();
        store
            .set("geo:1", &json!({"a": 1}), 60, CacheType::Geo)
            .await
            .unwrap();
        store
            .set("geo:2", &json!({"a": 2}), 60, CacheType::Geo)
            .await
            .unwrap();
        store
            .set("feed:1", &json!({"b": 1}), 60, CacheType::Feed)
            .await
            .unwrap();

        store.get("geo:1").await.unwrap();
        store.get("geo:1").await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_hits, 2);
        assert_eq!(stats.by_type["geo"].count, 2);
        assert_eq!(stats.by_type["geo"].hits, 2);
        assert!((stats.by_type["geo"].avg_hits - 1.0).abs() < f64::EPSILON);
        assert_eq!(stats.by_type["feed"].count, 1);
        assert!(stats.total_size_mb > 0.0);
    }

    #[tokio::test]
    async fn test_scaling_report_empty_when_small() {
        let store = MemoryStore::new();
        let report = store.scaling_needs().await.unwrap();
        assert!(report.scaling_actions.is_empty());
    }
}
