//! # Parlor Test Suite
//!
//! Unified test crate wiring the workspace crates together:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── gateway_flow.rs   # Pipeline end-to-end: audit, gates, limiter
//!     ├── signal_flow.rs    # Lifecycle publishes and handler reactions
//!     ├── cached_reads.rs   # Threaded reads through the TTL cache
//!     └── e2e.rs            # Request → pipeline → lifecycle → read path
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p parlor-tests
//!
//! # By category
//! cargo test -p parlor-tests integration::gateway_flow
//! cargo test -p parlor-tests integration::signal_flow
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;

use tracing_subscriber::EnvFilter;

/// Opt into log output for a test run via `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
