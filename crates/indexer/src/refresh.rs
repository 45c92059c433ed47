//! Periodic refresh of derived views.
//!
//! Every refresh re-runs a full acquisition; nothing is carried over between
//! runs except the last successful result, which readers can fetch without
//! waiting on the next run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::RefreshConfig;

/// The last successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshSnapshot<T> {
    /// Refreshed value.
    pub value: T,
    /// Count of successful refreshes so far, starting at 1.
    pub generation: u64,
    /// When the refresh completed (Unix timestamp).
    pub refreshed_at: i64,
}

/// Counters returned when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    /// Successful runs.
    pub refreshes: u64,
    /// Failed runs.
    pub failures: u64,
}

/// Runs a refresh task on a fixed interval, backing off after failures.
#[derive(Clone)]
pub struct RefreshScheduler<T> {
    interval: Duration,
    max_backoff: Duration,
    latest: Arc<RwLock<Option<RefreshSnapshot<T>>>>,
}

impl<T: Clone + Send + Sync> RefreshScheduler<T> {
    /// Create a scheduler.
    ///
    /// # Arguments
    ///
    /// * `interval` - Delay after a successful run
    /// * `max_backoff` - Cap on the delay after consecutive failures
    pub fn new(interval: Duration, max_backoff: Duration) -> Self {
        Self {
            interval,
            max_backoff: max_backoff.max(interval),
            latest: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a scheduler from the `[refresh]` section.
    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.max_backoff_secs),
        )
    }

    /// Delay before the next run after `consecutive_failures` failures.
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.interval;
        }
        let factor = 1u32 << consecutive_failures.min(16);
        self.interval.saturating_mul(factor).min(self.max_backoff)
    }

    /// The last successful result, `None` before the first success.
    pub async fn latest(&self) -> Option<RefreshSnapshot<T>> {
        self.latest.read().await.clone()
    }

    /// Run `task` immediately and then repeatedly until `shutdown` resolves.
    ///
    /// A failing run is logged and retried; it never stops the loop or
    /// clears the last good snapshot.
    pub async fn run<F, Fut, S>(&self, mut task: F, shutdown: S) -> RefreshStats
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
        S: Future<Output = ()>,
    {
        info!("Refresh loop starting with interval: {:?}", self.interval);

        let mut shutdown = std::pin::pin!(shutdown);
        let mut stats = RefreshStats::default();
        let mut consecutive_failures = 0u32;

        loop {
            let result = tokio::select! {
                _ = &mut shutdown => break,
                result = task() => result,
            };

            match result {
                Ok(value) => {
                    stats.refreshes += 1;
                    consecutive_failures = 0;
                    *self.latest.write().await = Some(RefreshSnapshot {
                        value,
                        generation: stats.refreshes,
                        refreshed_at: chrono::Utc::now().timestamp(),
                    });
                    debug!(generation = stats.refreshes, "Refresh completed");
                }
                Err(e) => {
                    stats.failures += 1;
                    consecutive_failures = consecutive_failures.saturating_add(1);
                    warn!("Refresh failed (attempt {}): {:#}", consecutive_failures, e);
                }
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.next_delay(consecutive_failures)) => {}
            }
        }

        info!(
            refreshes = stats.refreshes,
            failures = stats.failures,
            "Refresh loop stopped"
        );
        stats
    }
}
