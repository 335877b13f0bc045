//! Sliding-window rate limiter keyed by client.
//!
//! Keeps one timestamp log per client key. A check prunes entries older than
//! the window, compares the survivor count against the budget, and records
//! the call only when it is admitted. The prune, the comparison, and the
//! append happen under one per-key lock, so two concurrent requests can never
//! both claim the final slot.

use crate::domain::config::RateLimitConfig;
use crate::request::ClientKey;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

/// Per-client sliding-window limiter.
///
/// This is a value constructed per pipeline, never process-wide state; tests
/// build as many independent limiters as they need.
pub struct SlidingWindowLimiter {
    /// Calls admitted per key within one window
    max_calls: usize,
    /// Window length
    window: Duration,
    /// Per-key timestamp logs
    buckets: DashMap<ClientKey, Mutex<Vec<DateTime<Utc>>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `max_calls` per `window_secs` per key.
    #[must_use]
    pub fn new(max_calls: u32, window_secs: u64) -> Self {
        Self {
            max_calls: max_calls as usize,
            window: Duration::seconds(window_secs as i64),
            buckets: DashMap::new(),
        }
    }

    /// Create a limiter from the rate-limit configuration.
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_calls, config.window_secs)
    }

    /// Check one call for `key` at instant `now`.
    ///
    /// Admitted calls are recorded; rejected calls are not, so hammering a
    /// full bucket never extends the lockout. `Err` carries the wait until
    /// the oldest surviving call ages out.
    pub fn check(&self, key: &ClientKey, now: DateTime<Utc>) -> Result<(), std::time::Duration> {
        let bucket = self.buckets.entry(key.clone()).or_insert_with(|| {
            debug!(client = %key, "creating rate limit bucket");
            Mutex::new(Vec::new())
        });
        let mut stamps = bucket.lock();

        stamps.retain(|stamp| now - *stamp < self.window);

        if stamps.len() >= self.max_calls {
            let retry_after = stamps
                .iter()
                .min()
                .map(|oldest| *oldest + self.window - now)
                .unwrap_or_else(Duration::zero);
            Err(retry_after.to_std().unwrap_or_default())
        } else {
            stamps.push(now);
            Ok(())
        }
    }

    /// Number of client keys currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.buckets.len()
    }

    /// Drop buckets with no call left inside the window.
    pub fn cleanup(&self, now: DateTime<Utc>) {
        self.buckets.retain(|key, bucket| {
            let stamps = bucket.lock();
            let live = stamps.iter().any(|stamp| now - *stamp < self.window);
            if !live {
                debug!(client = %key, "removing idle rate limit bucket");
            }
            live
        });
    }
}
