//! Rate-limit gate: caps message sends per client within a sliding window.

use crate::domain::config::RateLimitConfig;
use crate::domain::error::Rejection;
use crate::limiter::SlidingWindowLimiter;
use crate::pipeline::{Stage, StageOutcome};
use crate::request::{Method, RequestDescriptor};
use async_trait::async_trait;
use tracing::warn;

/// Applies the sliding-window limiter to the configured write target.
///
/// Everything that is not a matching method + path combination bypasses the
/// limiter entirely; reads stay unlimited however often a client polls.
pub struct RateLimitStage {
    limiter: SlidingWindowLimiter,
    target_method: Method,
    target_path_fragment: String,
    max_calls: u32,
    window_secs: u64,
}

impl RateLimitStage {
    /// Create the stage around an externally constructed limiter.
    #[must_use]
    pub fn with_limiter(limiter: SlidingWindowLimiter, config: &RateLimitConfig) -> Self {
        Self {
            limiter,
            target_method: config.target_method,
            target_path_fragment: config.target_path_fragment.clone(),
            max_calls: config.max_calls,
            window_secs: config.window_secs,
        }
    }

    /// Create the stage with its own limiter from configuration.
    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::with_limiter(SlidingWindowLimiter::from_config(config), config)
    }

    fn is_target(&self, request: &RequestDescriptor) -> bool {
        request.method == self.target_method
            && request.path.contains(&self.target_path_fragment)
    }
}

#[async_trait]
impl Stage for RateLimitStage {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    async fn apply(&self, request: &RequestDescriptor) -> StageOutcome {
        if !self.is_target(request) {
            return StageOutcome::Continue;
        }

        let key = request.client_key();
        match self.limiter.check(&key, request.received_at) {
            Ok(()) => StageOutcome::Continue,
            Err(retry_after) => {
                warn!(
                    client = %key,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "rate limit exceeded"
                );
                StageOutcome::Reject(Rejection::rate_limited(self.max_calls, self.window_secs))
            }
        }
    }
}
