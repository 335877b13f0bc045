// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Parlor Store - Storage ports and the cached read path.
//!
//! The reaction handlers and the lifecycle service talk to storage through
//! the async port traits in [`ports`]; [`memory::MemoryStore`] is the
//! backend that implements all of them, including the cascading message
//! delete. [`threads`] assembles flat message lists into reply trees without
//! recursion, and [`conversations::ConversationThreads`] serves that
//! assembly through a TTL cache with an explicit invalidation entry point.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod conversations;
pub mod error;
pub mod memory;
pub mod ports;
pub mod query_cache;
pub mod threads;

// Re-exports for public API
pub use conversations::ConversationThreads;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use ports::{
    CascadeReport, ConversationStore, HistoryStore, MessageStore, NotificationStore, UserStore,
};
pub use query_cache::QueryCache;
pub use threads::{ThreadNode, ThreadedConversation};
