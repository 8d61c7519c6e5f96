//! Remote Cache Store Adapter
//!
//! Thin client for the managed store's RPC interface. One long-lived
//! `reqwest::Client` is shared across all concurrent requests; its pooling
//! provides the concurrency safety, not this adapter. No retries and no
//! adapter-level timeout: a failed call is reported once and callers degrade
//! per the facade's fail-open policy.

use crate::cache::classify::CacheType;
use crate::cache::store::{
    first_row, CacheStore, CleanupReport, ScalingReport, StoreLookup, StoreStats,
};
use crate::cache::strategy::CacheStrategy;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the remote store client
#[derive(Debug, Clone)]
pub struct RemoteStoreConfig {
    /// Base URL of the store's RPC endpoint, without trailing slash
    pub base_url: String,
    /// Service key sent with every call
    pub service_key: String,
}

// =============================================================================
// Remote Store
// =============================================================================

/// RPC-backed implementation of [`CacheStore`]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteStore {
    /// Create a client for the given store
    pub fn new(config: RemoteStoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(&config.service_key)
            .map_err(|e| Error::Configuration(format!("Invalid service key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|e| Error::Configuration(format!("Invalid service key: {}", e)))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Invoke a store function and return its raw JSON response
    async fn rpc(&self, function: &str, params: Value) -> Result<Value> {
        let url = format!("{}/rpc/{}", self.base_url, function);
        let response = self
            .client
            .post(&url)
            .json(&params)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

// =============================================================================
// Row Parsing
// =============================================================================

/// Raw lookup row as returned by `cache_get`
#[derive(Debug, Deserialize)]
struct LookupRow {
    #[serde(default)]
    status: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Parse a `cache_get` response into a lookup result
///
/// Anything whose status is not exactly `"hit"` is a miss, including
/// malformed rows. A hit without a `data` field carries a null payload,
/// the same as a cached literal null.
fn parse_lookup(response: Value) -> StoreLookup {
    let row = match first_row(response) {
        Some(row) => row,
        None => return StoreLookup::Miss,
    };
    match serde_json::from_value::<LookupRow>(row) {
        Ok(LookupRow { status, data }) if status == "hit" => StoreLookup::Hit {
            data: data.unwrap_or(Value::Null),
        },
        _ => StoreLookup::Miss,
    }
}

/// Parse a `cache_set` response; an `error` field means the write was
/// rejected, any other shape counts as accepted.
fn parse_write_ack(response: Value) -> bool {
    match first_row(response) {
        Some(row) => row.get("error").map(Value::is_null).unwrap_or(true),
        None => true,
    }
}

#[async_trait]
impl CacheStore for RemoteStore {
    async fn get(&self, key: &str) -> Result<StoreLookup> {
        // Transport failures read as misses, absorbed here
        match self.rpc("cache_get", json!({ "key": key })).await {
            Ok(response) => Ok(parse_lookup(response)),
            Err(e) => {
                warn!(key = key, error = %e, "Store get failed, treating as miss");
                Ok(StoreLookup::Miss)
            }
        }
    }

    async fn set(
        &self,
        key: &str,
        data: &Value,
        ttl_minutes: u32,
        cache_type: CacheType,
    ) -> Result<bool> {
        let params = json!({
            "key": key,
            "data": data,
            "cache_type": cache_type.as_str(),
            "ttl_minutes": ttl_minutes,
        });
        match self.rpc("cache_set", params).await {
            Ok(response) => Ok(parse_write_ack(response)),
            Err(e) => {
                warn!(key = key, error = %e, "Store set failed");
                Ok(false)
            }
        }
    }

    async fn stats(&self) -> Result<StoreStats> {
        // A zeroed structure is more useful to the stats surface than an
        // error nobody retries
        match self.rpc("get_cache_stats", json!({})).await {
            Ok(response) => match first_row(response) {
                Some(row) => match serde_json::from_value(row) {
                    Ok(stats) => Ok(stats),
                    Err(e) => {
                        warn!(error = %e, "Malformed store stats row");
                        Ok(StoreStats::default())
                    }
                },
                None => Ok(StoreStats::default()),
            },
            Err(e) => {
                warn!(error = %e, "Store stats failed");
                Ok(StoreStats::default())
            }
        }
    }

    async fn cleanup(&self) -> Result<CleanupReport> {
        let response = self.rpc("smart_cache_cleanup", json!({})).await?;
        let row = first_row(response)
            .ok_or_else(|| Error::StoreResponse("empty cleanup response".into()))?;
        Ok(serde_json::from_value(row)?)
    }

    async fn strategy_for(
        &self,
        endpoint: &str,
        region: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CacheStrategy>> {
        let params = json!({
            "endpoint": endpoint,
            "region": region,
            "time": at.to_rfc3339(),
        });
        let response = self.rpc("get_adaptive_cache_strategy", params).await?;
        match first_row(response) {
            Some(row) => Ok(Some(serde_json::from_value(row)?)),
            None => Ok(None),
        }
    }

    async fn scaling_needs(&self) -> Result<ScalingReport> {
        let response = self.rpc("check_scaling_needs", json!({})).await?;
        match first_row(response) {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Ok(ScalingReport::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_lookup_hit() {
        let lookup = parse_lookup(json!({"status": "hit", "data": {"lat": 41.3}}));
        assert_eq!(
            lookup,
            StoreLookup::Hit {
                data: json!({"lat": 41.3})
            }
        );
    }

    #[test]
    fn test_parse_lookup_array_wrapped() {
        let lookup = parse_lookup(json!([{"status": "hit", "data": 7}]));
        assert_eq!(lookup, StoreLookup::Hit { data: json!(7) });
    }

    #[test]
    fn test_parse_lookup_miss_shapes() {
        // Explicit miss, null, empty array, malformed rows: all misses
        assert_eq!(
            parse_lookup(json!({"status": "miss", "data": null})),
            StoreLookup::Miss
        );
        assert_eq!(parse_lookup(Value::Null), StoreLookup::Miss);
        assert_eq!(parse_lookup(json!([])), StoreLookup::Miss);
        assert_eq!(parse_lookup(json!({"unexpected": true})), StoreLookup::Miss);
        assert_eq!(parse_lookup(json!("garbage")), StoreLookup::Miss);
    }

    #[test]
    fn test_parse_lookup_hit_with_null_payload() {
        // A cached literal null is still a hit, as in the in-process store
        assert_eq!(
            parse_lookup(json!({"status": "hit", "data": null})),
            StoreLookup::Hit { data: Value::Null }
        );
        assert_eq!(
            parse_lookup(json!({"status": "hit"})),
            StoreLookup::Hit { data: Value::Null }
        );
    }

    #[test]
    fn test_parse_write_ack() {
        assert!(parse_write_ack(Value::Null));
        assert!(parse_write_ack(json!({})));
        assert!(parse_write_ack(json!({"error": null})));
        assert!(!parse_write_ack(json!({"error": "duplicate key"})));
        assert!(!parse_write_ack(json!([{"error": "constraint"}])));
    }

    #[test]
    fn test_config_rejects_bad_service_key() {
        let result = RemoteStore::new(RemoteStoreConfig {
            base_url: "http://store.local".into(),
            service_key: "bad\nkey".into(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = RemoteStore::new(RemoteStoreConfig {
            base_url: "http://store.local/".into(),
            service_key: "svc-key".into(),
        })
        .unwrap();
        assert_eq!(store.base_url, "http://store.local");
    }
}
