//! Maintenance Scheduler
//!
//! Recurring background cleanup of the backing store. The scheduler is
//! process-wide singleton state with a start/stop lifecycle tied to
//! application startup/shutdown; the task it spawns is cancellable, not a
//! bare fire-and-forget interval.
//!
//! Cleanup is best-effort housekeeping. A long period avoids contention
//! with live traffic while still bounding growth, and a failed pass simply
//! waits for the next tick.

use crate::cache::store::CacheStoreRef;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default interval between cleanup passes: 6 hours
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

// =============================================================================
// Scheduler
// =============================================================================

enum SchedulerState {
    Idle,
    Running {
        token: CancellationToken,
        handle: JoinHandle<()>,
    },
}

/// Recurring cleanup driver for the backing store
///
/// Two states: idle (no task) and running (cancellable task registered).
/// `start` and `stop` are both idempotent.
pub struct MaintenanceScheduler {
    store: CacheStoreRef,
    period: Duration,
    state: Mutex<SchedulerState>,
}

impl MaintenanceScheduler {
    /// Create a scheduler with the default 6-hour period
    pub fn new(store: CacheStoreRef) -> Self {
        Self::with_period(store, DEFAULT_CLEANUP_INTERVAL)
    }

    /// Create a scheduler with a custom period
    pub fn with_period(store: CacheStoreRef, period: Duration) -> Self {
        Self {
            store,
            period,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    /// Start the recurring cleanup task
    ///
    /// The first pass runs immediately, not after the first interval.
    /// Returns false without spawning a second task if already running.
    pub fn start(&self) -> bool {
        let mut state = self.state.lock();
        if matches!(*state, SchedulerState::Running { .. }) {
            return false;
        }

        let token = CancellationToken::new();
        let task_token = token.clone();
        let store = self.store.clone();
        let period = self.period;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    // First tick completes immediately
                    _ = ticker.tick() => run_cleanup_pass(&store).await,
                }
            }
        });

        *state = SchedulerState::Running { token, handle };
        info!(period_secs = self.period.as_secs(), "Cache maintenance scheduler started");
        true
    }

    /// Stop the recurring cleanup task
    ///
    /// Returns false if the scheduler was already idle.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        match std::mem::replace(&mut *state, SchedulerState::Idle) {
            SchedulerState::Running { token, handle } => {
                token.cancel();
                // The task exits at its next select point; an in-flight
                // cleanup call still runs to completion store-side.
                drop(handle);
                info!("Cache maintenance scheduler stopped");
                true
            }
            SchedulerState::Idle => false,
        }
    }

    /// Check whether a cleanup task is registered
    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), SchedulerState::Running { .. })
    }
}

impl Drop for MaintenanceScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one cleanup pass, logging the report or the failure
async fn run_cleanup_pass(store: &CacheStoreRef) {
    match store.cleanup().await {
        Ok(report) => {
            info!(
                total_deleted = report.total_deleted,
                expired_deleted = report.expired_deleted,
                low_priority_deleted = report.low_priority_deleted,
                cleaned_at = %report.cleaned_at,
                "Cache cleanup pass completed"
            );
        }
        Err(e) => {
            warn!(error = %e, "Cache cleanup pass failed, will retry next tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::classify::CacheType;
    use crate::cache::store::{
        CacheStore, CleanupReport, ScalingReport, StoreLookup, StoreStats,
    };
    use crate::cache::strategy::CacheStrategy;
    use crate::error::{Error, Result};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct CleanupProbe {
        passes: AtomicU64,
        fail: bool,
    }

    impl CleanupProbe {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                passes: AtomicU64::new(0),
                fail,
            })
        }
    }

    #[async_trait]
    impl CacheStore for CleanupProbe {
        async fn get(&self, _key: &str) -> Result<StoreLookup> {
            Ok(StoreLookup::Miss)
        }
        async fn set(
            &self,
            _key: &str,
            _data: &Value,
            _ttl_minutes: u32,
            _cache_type: CacheType,
        ) -> Result<bool> {
            Ok(true)
        }
        async fn stats(&self) -> Result<StoreStats> {
            Ok(StoreStats::default())
        }
        async fn cleanup(&self) -> Result<CleanupReport> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::StoreResponse("cleanup unavailable".into()))
            } else {
                Ok(CleanupReport {
                    total_deleted: 0,
                    expired_deleted: 0,
                    low_priority_deleted: 0,
                    cleaned_at: Utc::now(),
                })
            }
        }
        async fn strategy_for(
            &self,
            _endpoint: &str,
            _region: &str,
            _at: DateTime<Utc>,
        ) -> Result<Option<CacheStrategy>> {
            Ok(None)
        }
        async fn scaling_needs(&self) -> Result<ScalingReport> {
            Ok(ScalingReport::default())
        }
    }

    #[tokio::test]
    async fn test_immediate_first_pass() {
        let probe = CleanupProbe::new(false);
        let scheduler = MaintenanceScheduler::with_period(probe.clone(), Duration::from_secs(3600));

        assert!(scheduler.start());
        tokio::time::sleep(Duration::from_millis(100)).await;

        // One pass already ran, well before the first hour elapsed
        assert_eq!(probe.passes.load(Ordering::SeqCst), 1);
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let probe = CleanupProbe::new(false);
        let scheduler = MaintenanceScheduler::with_period(probe.clone(), Duration::from_secs(3600));

        assert!(scheduler.start());
        assert!(!scheduler.start());
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(100)).await;
        // A second start must not register a second timer
        assert_eq!(probe.passes.load(Ordering::SeqCst), 1);
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let probe = CleanupProbe::new(false);
        let scheduler = MaintenanceScheduler::with_period(probe, Duration::from_secs(3600));

        assert!(!scheduler.stop()); // idle stop is a no-op
        assert!(scheduler.start());
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_failed_pass_does_not_kill_scheduler() {
        let probe = CleanupProbe::new(true);
        let scheduler = MaintenanceScheduler::with_period(probe.clone(), Duration::from_millis(50));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(180)).await;

        // Several failing passes, scheduler still running
        assert!(probe.passes.load(Ordering::SeqCst) >= 2);
        assert!(scheduler.is_running());
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let probe = CleanupProbe::new(false);
        let scheduler = MaintenanceScheduler::with_period(probe.clone(), Duration::from_secs(3600));

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.stop();

        assert!(scheduler.start());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(probe.passes.load(Ordering::SeqCst), 2);
        scheduler.stop();
    }
}
