//! Smart Cache Facade
//!
//! The single entry point every route handler uses for cache interaction.
//! Composes strategy resolution, access validation, and the store port into
//! one request/response contract with defined status outcomes.
//!
//! Failure semantics: nothing in here ever propagates an error to the
//! caller. Reads degrade to [`CacheReadResult::Miss`], writes to
//! `success: false`. The only explicit non-success state is
//! [`CacheReadResult::InvalidAccess`], which is a policy decision rather
//! than a fault.

use crate::cache::access::{AccessValidator, REQUIRED_PERMISSIONS};
use crate::cache::classify::CacheType;
use crate::cache::metrics::{FacadeMetrics, FacadeMetricsSnapshot};
use crate::cache::store::{CacheStoreRef, StoreLookup};
use crate::cache::strategy::StrategyResolver;
use crate::cache::{CacheReadResult, CacheWriteResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

// =============================================================================
// Smart Cache
// =============================================================================

/// The smart get/set protocol over the backing store
///
/// One instance is created at process startup and shared by handle; it is
/// never recreated per request.
pub struct SmartCache {
    store: CacheStoreRef,
    resolver: StrategyResolver,
    validator: AccessValidator,
    metrics: FacadeMetrics,
}

impl SmartCache {
    /// Create a facade over the given store
    pub fn new(store: CacheStoreRef) -> Arc<Self> {
        let resolver = StrategyResolver::new(store.clone());
        Self::with_resolver(store, resolver)
    }

    /// Create a facade whose strategy lookups assume the given region when
    /// a call site supplies none
    pub fn with_default_region(store: CacheStoreRef, default_region: impl Into<String>) -> Arc<Self> {
        let resolver = StrategyResolver::with_default_region(store.clone(), default_region);
        Self::with_resolver(store, resolver)
    }

    fn with_resolver(store: CacheStoreRef, resolver: StrategyResolver) -> Arc<Self> {
        Arc::new(Self {
            store,
            resolver,
            validator: AccessValidator::new(),
            metrics: FacadeMetrics::new(),
        })
    }

    /// Read a key
    ///
    /// The access gate runs before the store is touched. Store errors and
    /// true misses are deliberately indistinguishable in the result: both
    /// tell the caller to recompute.
    pub async fn get(&self, key: &str, endpoint: &str, region: &str) -> CacheReadResult {
        let strategy = self.resolver.resolve(endpoint, region).await;

        if !self.validator.validate(key, REQUIRED_PERMISSIONS) {
            self.metrics.record_denial();
            return CacheReadResult::InvalidAccess;
        }

        match self.store.get(key).await {
            Ok(StoreLookup::Hit { data }) => {
                self.metrics.record_hit();
                debug!(key = key, endpoint = endpoint, "Cache hit");
                CacheReadResult::Hit { data, strategy }
            }
            Ok(StoreLookup::Miss) => {
                self.metrics.record_miss();
                debug!(key = key, endpoint = endpoint, "Cache miss");
                CacheReadResult::Miss { strategy }
            }
            Err(e) => {
                self.metrics.record_miss();
                warn!(key = key, endpoint = endpoint, error = %e, "Cache read failed, degrading to miss");
                CacheReadResult::Miss { strategy }
            }
        }
    }

    /// Write a key, classifying the cache type from the endpoint name
    pub async fn set(
        &self,
        key: &str,
        data: Value,
        endpoint: &str,
        region: &str,
    ) -> CacheWriteResult {
        let cache_type = CacheType::classify(endpoint);
        self.set_with_type(key, data, cache_type, endpoint, region)
            .await
    }

    /// Write a key with an explicit cache type
    ///
    /// For call sites whose category is not derivable from the endpoint
    /// name (feed, flights, composite search).
    pub async fn set_with_type(
        &self,
        key: &str,
        data: Value,
        cache_type: CacheType,
        endpoint: &str,
        region: &str,
    ) -> CacheWriteResult {
        let strategy = self.resolver.resolve(endpoint, region).await;

        if !self.validator.validate(key, REQUIRED_PERMISSIONS) {
            self.metrics.record_denial();
            return CacheWriteResult {
                success: false,
                strategy,
            };
        }

        let success = match self
            .store
            .set(key, &data, strategy.ttl_minutes, cache_type)
            .await
        {
            Ok(accepted) => {
                if !accepted {
                    warn!(key = key, cache_type = %cache_type, "Store rejected cache write");
                }
                accepted
            }
            Err(e) => {
                warn!(key = key, cache_type = %cache_type, error = %e, "Cache write failed");
                false
            }
        };

        if success {
            self.metrics.record_write();
            debug!(
                key = key,
                cache_type = %cache_type,
                ttl_minutes = strategy.ttl_minutes,
                "Stored cache entry"
            );
        } else {
            self.metrics.record_write_failure();
        }

        CacheWriteResult { success, strategy }
    }

    /// Snapshot of facade-side counters
    pub fn metrics(&self) -> FacadeMetricsSnapshot {
        self.metrics.snapshot()
    }
}
