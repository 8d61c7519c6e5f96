//! Adaptive Strategy Resolution
//!
//! Resolves a caching strategy (TTL, priority, named policy) for an
//! (endpoint, region) pair by consulting the remote store, falling back to
//! a static default on any failure. Resolution is deliberately permissive:
//! it must never fail the request path. The worst case is suboptimal
//! caching, not broken caching.

use crate::cache::store::CacheStoreRef;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// =============================================================================
// Defaults
// =============================================================================

/// TTL applied when no adaptive strategy is available
pub const DEFAULT_TTL_MINUTES: u32 = 60;

/// Priority applied when no adaptive strategy is available
pub const DEFAULT_PRIORITY: u8 = 3;

/// Name of the static fallback strategy
pub const DEFAULT_STRATEGY_NAME: &str = "default";

/// Region assumed when the caller does not supply one
pub const DEFAULT_REGION: &str = "eu";

// =============================================================================
// Cache Strategy
// =============================================================================

/// A resolved caching strategy for one (endpoint, region) pair
///
/// Never mutated after construction; safe to discard and recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStrategy {
    /// Time-to-live for entries written under this strategy
    pub ttl_minutes: u32,
    /// Eviction priority (small ordinal range; higher survives longer)
    pub priority: u8,
    /// Name of the policy that produced this strategy
    pub strategy_name: String,
    /// Region the strategy was resolved for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for CacheStrategy {
    fn default() -> Self {
        Self {
            ttl_minutes: DEFAULT_TTL_MINUTES,
            priority: DEFAULT_PRIORITY,
            strategy_name: DEFAULT_STRATEGY_NAME.to_string(),
            region: None,
        }
    }
}

// =============================================================================
// Strategy Resolver
// =============================================================================

/// Resolves adaptive strategies from the remote store
pub struct StrategyResolver {
    store: CacheStoreRef,
    default_region: String,
}

impl StrategyResolver {
    /// Create a resolver backed by the given store, defaulting to
    /// [`DEFAULT_REGION`] when the caller supplies no region
    pub fn new(store: CacheStoreRef) -> Self {
        Self::with_default_region(store, DEFAULT_REGION)
    }

    /// Create a resolver with a deployment-specific default region
    pub fn with_default_region(store: CacheStoreRef, default_region: impl Into<String>) -> Self {
        Self {
            store,
            default_region: default_region.into(),
        }
    }

    /// Resolve the strategy for an endpoint/region pair
    ///
    /// An empty region means "not supplied" and resolves against the
    /// default region. Always succeeds: a store error, empty result, or
    /// malformed row produces the static default strategy.
    pub async fn resolve(&self, endpoint: &str, region: &str) -> CacheStrategy {
        let region = if region.is_empty() {
            self.default_region.as_str()
        } else {
            region
        };
        match self.store.strategy_for(endpoint, region, Utc::now()).await {
            Ok(Some(strategy)) => {
                debug!(
                    endpoint = endpoint,
                    region = region,
                    strategy = %strategy.strategy_name,
                    ttl_minutes = strategy.ttl_minutes,
                    "Resolved adaptive cache strategy"
                );
                strategy
            }
            Ok(None) => CacheStrategy::default(),
            Err(e) => {
                warn!(
                    endpoint = endpoint,
                    region = region,
                    error = %e,
                    "Strategy lookup failed, using default strategy"
                );
                CacheStrategy::default()
            }
        }
    }
}
