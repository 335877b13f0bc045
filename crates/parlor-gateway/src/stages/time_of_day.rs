//! Time-of-day gate: the app is only reachable during the access window.

use crate::domain::config::TimeWindowConfig;
use crate::domain::error::Rejection;
use crate::pipeline::{Stage, StageOutcome};
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use chrono::Timelike;

/// Rejects requests whose arrival hour falls outside `[open_hour,
/// close_hour)`.
///
/// The bounds are hour-granular: with the 6/21 defaults, 06:00 is the first
/// admitted minute and 21:00 the first rejected one. Stateless; the hour is
/// read off the descriptor's arrival instant.
pub struct TimeOfDayStage {
    open_hour: u32,
    close_hour: u32,
}

impl TimeOfDayStage {
    /// Create a gate with explicit bounds.
    #[must_use]
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open_hour,
            close_hour,
        }
    }

    /// Create the gate from configuration.
    #[must_use]
    pub fn from_config(config: &TimeWindowConfig) -> Self {
        Self::new(config.open_hour, config.close_hour)
    }
}

#[async_trait]
impl Stage for TimeOfDayStage {
    fn name(&self) -> &'static str {
        "time_of_day"
    }

    async fn apply(&self, request: &RequestDescriptor) -> StageOutcome {
        let hour = request.received_at.hour();
        if hour < self.open_hour || hour >= self.close_hour {
            StageOutcome::Reject(Rejection::outside_window(
                self.open_hour,
                self.close_hour,
                request.received_at,
            ))
        } else {
            StageOutcome::Continue
        }
    }
}
