//! Policy rejection types.
//!
//! Every gate rejects with an HTTP-style status and a specific, user-facing
//! reason string. The constructor helpers below are the only places those
//! strings are assembled, so tests can assert them verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::Role;
use std::fmt;

/// HTTP-style status codes used by the pipeline
pub mod status {
    /// All policy gates reject with 403
    pub const FORBIDDEN: u16 = 403;
}

/// Which gate produced a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// Outside the permitted time-of-day window
    TimeWindow,
    /// Sliding-window rate limit exhausted
    RateLimit,
    /// Protected path with no authenticated identity
    AuthRequired,
    /// Protected path with an insufficient role
    RoleForbidden,
}

impl RejectionKind {
    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimeWindow => "time_window",
            Self::RateLimit => "rate_limit",
            Self::AuthRequired => "auth_required",
            Self::RoleForbidden => "role_forbidden",
        }
    }
}

/// A policy rejection produced by one pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// HTTP-style status code (always 403 for policy gates)
    pub status: u16,
    /// The gate that rejected
    pub kind: RejectionKind,
    /// User-facing reason string
    pub reason: String,
}

impl Rejection {
    /// Create a rejection with an explicit status code
    pub fn new(status: u16, kind: RejectionKind, reason: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            reason: reason.into(),
        }
    }

    /// Request arrived outside the permitted access window.
    #[must_use]
    pub fn outside_window(open_hour: u32, close_hour: u32, at: DateTime<Utc>) -> Self {
        Self::new(
            status::FORBIDDEN,
            RejectionKind::TimeWindow,
            format!(
                "Access to the messaging app is restricted outside {} to {}. Current time: {}",
                hour_label(open_hour),
                hour_label(close_hour),
                at.format("%H:%M"),
            ),
        )
    }

    /// Client exhausted its sliding-window budget.
    #[must_use]
    pub fn rate_limited(max_calls: u32, window_secs: u64) -> Self {
        Self::new(
            status::FORBIDDEN,
            RejectionKind::RateLimit,
            format!(
                "Rate limit exceeded. You can only send {} messages per {}. \
                 Please wait before sending another message.",
                max_calls,
                window_label(window_secs),
            ),
        )
    }

    /// Protected path reached without an authenticated identity.
    #[must_use]
    pub fn auth_required() -> Self {
        Self::new(
            status::FORBIDDEN,
            RejectionKind::AuthRequired,
            "Authentication required for this action.",
        )
    }

    /// Protected path reached with a role outside the allowed set.
    #[must_use]
    pub fn insufficient_role(allowed: &[Role], actual: Option<Role>) -> Self {
        let required = allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        let actual = actual.map_or("none", |role| role.as_str());
        Self::new(
            status::FORBIDDEN,
            RejectionKind::RoleForbidden,
            format!("Access denied. Required role: {required}. Your role: {actual}"),
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.reason)
    }
}

impl std::error::Error for Rejection {}

/// Render an hour-of-day bound as a 12-hour clock label ("6 AM", "9 PM").
fn hour_label(hour: u32) -> String {
    let h = hour % 24;
    let (display, suffix) = match h {
        0 => (12, "AM"),
        1..=11 => (h, "AM"),
        12 => (12, "PM"),
        _ => (h - 12, "PM"),
    };
    format!("{display} {suffix}")
}

/// Render a window length for the rate-limit reason string.
fn window_label(window_secs: u64) -> String {
    if window_secs == 60 {
        "minute".to_string()
    } else {
        format!("{window_secs} seconds")
    }
}
