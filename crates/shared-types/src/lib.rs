//! # Shared Types Crate
//!
//! This crate contains all domain entities shared by the gateway, store, and
//! signal crates.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Typed Identity**: A [`User`] always carries a [`Role`]; an
//!   unauthenticated request is represented as `Option::<User>::None`, never
//!   as a user with a missing role.
//! - **Opaque Ids**: Entity ids are uuid newtypes, not bare strings, so a
//!   message id cannot be passed where a conversation id is expected.

pub mod entities;

pub use entities::*;
