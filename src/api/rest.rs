//! REST API Handlers
//!
//! Implements the cache health/stats endpoint and the cleanup trigger.

use crate::cache::maintenance::MaintenanceScheduler;
use crate::cache::store::{CacheStoreRef, ScalingReport, StoreStats};
use crate::cache::SmartCache;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// System health: scaling status plus performance aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsResponse {
    pub scaling: ScalingStatusResponse,
    pub performance: PerformanceResponse,
    pub maintenance_running: bool,
}

/// Scaling assessment as reported by the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingStatusResponse {
    pub actions: Vec<ScalingActionResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingActionResponse {
    pub action: String,
    pub reason: String,
}

/// Store counters plus gateway-side counters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResponse {
    pub total_entries: u64,
    pub total_hits: u64,
    pub total_size_mb: f64,
    pub hit_rate: f64,
    pub by_type: BTreeMap<String, TypeStatsResponse>,
    pub gateway: GatewayCountersResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStatsResponse {
    pub count: u64,
    pub hits: u64,
    pub avg_hits: f64,
}

/// Facade-side counters since process start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayCountersResponse {
    pub hits: u64,
    pub misses: u64,
    pub denials: u64,
    pub writes: u64,
    pub write_failures: u64,
    pub hit_ratio: f64,
}

/// Cleanup trigger response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub total_deleted: u64,
    pub expired_deleted: u64,
    pub low_priority_deleted: u64,
    pub cleaned_at: DateTime<Utc>,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// =============================================================================
// REST Router
// =============================================================================

/// REST API router builder
pub struct RestRouter {
    cache: Arc<SmartCache>,
    store: CacheStoreRef,
    scheduler: Arc<MaintenanceScheduler>,
}

impl RestRouter {
    /// Create a new REST router
    pub fn new(
        cache: Arc<SmartCache>,
        store: CacheStoreRef,
        scheduler: Arc<MaintenanceScheduler>,
    ) -> Self {
        Self {
            cache,
            store,
            scheduler,
        }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        let state = AppState {
            cache: self.cache,
            store: self.store,
            scheduler: self.scheduler,
        };

        Router::new()
            // Cache endpoints
            .route("/v1/cache/stats", get(get_cache_stats))
            .route("/v1/cache/cleanup", post(trigger_cleanup))
            // Health endpoint
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }
}

/// Shared application state
#[derive(Clone)]
struct AppState {
    cache: Arc<SmartCache>,
    store: CacheStoreRef,
    scheduler: Arc<MaintenanceScheduler>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Cache system health: scaling status + performance aggregate
async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    // stats() already degrades to a zeroed structure on store failure
    let stats = state.store.stats().await.unwrap_or_default();

    let scaling = match state.store.scaling_needs().await {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "Scaling check failed, reporting no actions");
            ScalingReport::default()
        }
    };

    let gateway = state.cache.metrics();

    Json(CacheStatsResponse {
        scaling: ScalingStatusResponse {
            actions: scaling
                .scaling_actions
                .into_iter()
                .map(|a| ScalingActionResponse {
                    action: a.action,
                    reason: a.reason,
                })
                .collect(),
        },
        performance: performance_response(stats, &gateway),
        maintenance_running: state.scheduler.is_running(),
    })
}

fn performance_response(
    stats: StoreStats,
    gateway: &crate::cache::FacadeMetricsSnapshot,
) -> PerformanceResponse {
    let hit_ratio = gateway.hit_ratio();
    PerformanceResponse {
        total_entries: stats.total_entries,
        total_hits: stats.total_hits,
        total_size_mb: stats.total_size_mb,
        hit_rate: stats.hit_rate,
        by_type: stats
            .by_type
            .into_iter()
            .map(|(name, t)| {
                (
                    name,
                    TypeStatsResponse {
                        count: t.count,
                        hits: t.hits,
                        avg_hits: t.avg_hits,
                    },
                )
            })
            .collect(),
        gateway: GatewayCountersResponse {
            hits: gateway.hits,
            misses: gateway.misses,
            denials: gateway.denials,
            writes: gateway.writes,
            write_failures: gateway.write_failures,
            hit_ratio,
        },
    }
}

/// Trigger one cleanup pass immediately
async fn trigger_cleanup(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.cleanup().await {
        Ok(report) => (
            StatusCode::OK,
            Json(CleanupResponse {
                total_deleted: report.total_deleted,
                expired_deleted: report.expired_deleted,
                low_priority_deleted: report.low_priority_deleted,
                cleaned_at: report.cleaned_at,
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "On-demand cleanup failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiErrorResponse {
                    error: "cleanup_failed".into(),
                    message: e.to_string(),
                    details: None,
                }),
            )
                .into_response()
        }
    }
}

/// Liveness probe
async fn health_check() -> &'static str {
    "ok"
}
