//! Domain types for the gateway: configuration and rejection errors.

pub mod config;
pub mod error;

pub use config::{ConfigError, GatewayConfig};
pub use error::{Rejection, RejectionKind};
