//! Gateway configuration with validation.
//!
//! Every stage reads its knobs from here; validation runs once at startup so
//! the request path never sees a configuration error.

use crate::request::Method;
use serde::{Deserialize, Serialize};
use shared_types::Role;
use std::path::PathBuf;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Audit logging configuration
    pub audit: AuditConfig,
    /// Time-of-day access window
    pub time_window: TimeWindowConfig,
    /// Per-client rate limiting
    pub rate_limit: RateLimitConfig,
    /// Role-based authorization for protected paths
    pub role_gate: RoleGateConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            audit: AuditConfig::default(),
            time_window: TimeWindowConfig::default(),
            rate_limit: RateLimitConfig::default(),
            role_gate: RoleGateConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate the access window
        if self.time_window.open_hour > 23 {
            return Err(ConfigError::InvalidHours(
                "open_hour must be in 0..=23".into(),
            ));
        }
        if self.time_window.close_hour > 24 {
            return Err(ConfigError::InvalidHours(
                "close_hour must be in 1..=24".into(),
            ));
        }
        if self.time_window.open_hour >= self.time_window.close_hour {
            return Err(ConfigError::InvalidHours(
                "open_hour must be earlier than close_hour".into(),
            ));
        }

        // Validate rate limiting
        if self.rate_limit.max_calls == 0 {
            return Err(ConfigError::InvalidRateLimit("max_calls cannot be 0".into()));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "window_secs cannot be 0".into(),
            ));
        }
        if self.rate_limit.target_path_fragment.is_empty() {
            return Err(ConfigError::InvalidRateLimit(
                "target_path_fragment cannot be empty".into(),
            ));
        }

        // Validate the role gate
        if self.role_gate.allowed_roles.is_empty() {
            return Err(ConfigError::InvalidRoleGate(
                "allowed_roles cannot be empty".into(),
            ));
        }
        for prefix in &self.role_gate.protected_prefixes {
            if !prefix.starts_with('/') {
                return Err(ConfigError::InvalidRoleGate(format!(
                    "protected prefix {prefix:?} must start with '/'"
                )));
            }
        }

        // Validate audit output
        if self.audit.enabled && self.audit.log_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidAudit("log_path cannot be empty".into()));
        }

        Ok(())
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Enable the request-log stage
    pub enabled: bool,
    /// File the audit sink appends to
    pub log_path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: PathBuf::from("requests.log"),
        }
    }
}

/// Time-of-day access window configuration
///
/// Requests are admitted when `open_hour <= hour < close_hour`. The default
/// window is 06:00 to 21:00.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeWindowConfig {
    /// Enable the time-of-day gate
    pub enabled: bool,
    /// First admitted hour (inclusive)
    pub open_hour: u32,
    /// First rejected evening hour (exclusive upper bound)
    pub close_hour: u32,
}

impl Default for TimeWindowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            open_hour: 6,
            close_hour: 21,
        }
    }
}

/// Per-client rate limiting configuration
///
/// Only requests matching the write target (method + path fragment) are
/// counted; everything else bypasses the limiter entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable the rate-limit stage
    pub enabled: bool,
    /// Calls admitted per client within one window
    pub max_calls: u32,
    /// Window length in seconds
    pub window_secs: u64,
    /// HTTP method the limiter applies to
    pub target_method: Method,
    /// Path substring the limiter applies to
    pub target_path_fragment: String,
}

impl RateLimitConfig {
    /// Window length as a chrono duration for timestamp arithmetic.
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs as i64)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_calls: 5,
            window_secs: 60,
            target_method: Method::Post,
            target_path_fragment: "/api/messages/".to_string(),
        }
    }
}

/// Role-based authorization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleGateConfig {
    /// Enable the role-check stage
    pub enabled: bool,
    /// Path prefixes that require a privileged role
    pub protected_prefixes: Vec<String>,
    /// Roles admitted on protected paths
    pub allowed_roles: Vec<Role>,
}

impl Default for RoleGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            protected_prefixes: vec![
                "/admin/".to_string(),
                "/api/users/".to_string(),
                "/api/conversations/".to_string(),
            ],
            allowed_roles: vec![Role::Admin, Role::Moderator],
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid access-window hours
    #[error("invalid access window: {0}")]
    InvalidHours(String),
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid role gate configuration
    #[error("invalid role gate: {0}")]
    InvalidRoleGate(String),
    /// Invalid audit configuration
    #[error("invalid audit config: {0}")]
    InvalidAudit(String),
}
