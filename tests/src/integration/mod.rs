//! Cross-crate integration flows.

pub mod cached_reads;
pub mod signal_flow;
