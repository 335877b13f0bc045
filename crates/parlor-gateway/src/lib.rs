// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Parlor Gateway - Policy interception pipeline for the messaging API.
//!
//! Every inbound request passes through this crate before any resource
//! handler runs. The pipeline enforces cross-cutting policy in a fixed
//! order and stops at the first stage that rejects.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      POLICY PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  RequestDescriptor                                           │
//! │        │                                                     │
//! │        ▼                                                     │
//! │  ┌───────────────┐   never rejects; one audit line          │
//! │  │  RequestLog   │──────────────────────────────▶ AuditSink │
//! │  └───────┬───────┘                                           │
//! │          ▼                                                   │
//! │  ┌───────────────┐   hour ∉ [open, close) → 403             │
//! │  │  TimeOfDay    │                                           │
//! │  └───────┬───────┘                                           │
//! │          ▼                                                   │
//! │  ┌───────────────┐   write target only; 6th call in         │
//! │  │  RateLimit    │   the window → 403                        │
//! │  └───────┬───────┘                                           │
//! │          ▼                                                   │
//! │  ┌───────────────┐   protected prefixes only;               │
//! │  │  RoleCheck    │   missing/insufficient role → 403        │
//! │  └───────┬───────┘                                           │
//! │          ▼                                                   │
//! │   terminal handler (the CRUD resource logic, out of scope)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use parlor_gateway::{GatewayConfig, PolicyPipeline};
//! use parlor_gateway::audit::FileAuditSink;
//! use std::sync::Arc;
//!
//! let config = GatewayConfig::default();
//! let sink = Arc::new(FileAuditSink::open(&config.audit.log_path)?);
//! let pipeline = PolicyPipeline::from_config(&config, sink)?;
//! let decision = pipeline.evaluate(&request).await;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod domain;
pub mod limiter;
pub mod pipeline;
pub mod request;
pub mod stages;

// Re-exports for public API
pub use domain::config::{
    AuditConfig, ConfigError, GatewayConfig, RateLimitConfig, RoleGateConfig, TimeWindowConfig,
};
pub use domain::error::{status, Rejection, RejectionKind};
pub use limiter::SlidingWindowLimiter;
pub use pipeline::{PolicyPipeline, Stage, StageOutcome};
pub use request::{ClientKey, Method, PolicyDecision, RequestDescriptor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
