// Allow missing docs for internal items in development
#![allow(missing_docs)]

//! Parlor Signals - Lifecycle event dispatch for the messaging domain.
//!
//! Mutations to messages and users publish typed [`ChangeEvent`]s through a
//! [`SignalHub`]. Handlers are registered per event kind at startup and run
//! synchronously, in registration order, on the publishing task. There is no
//! background queue: when `publish` returns, every reaction has run.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   MESSAGING LIFECYCLE                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  create_message ─── insert ──▶ publish MessageCreated        │
//! │                                   └─▶ NotificationHandler    │
//! │                                       (best-effort fan-out)  │
//! │                                                              │
//! │  update_message ─── publish MessageUpdating ─── apply_update │
//! │                        └─▶ HistoryHandler                    │
//! │                            (mandatory; failure aborts the    │
//! │                             update before it is applied)     │
//! │                                                              │
//! │  delete_user ────── remove ──▶ publish UserDeleted           │
//! │                                   └─▶ CleanupHandler         │
//! │                                       (best-effort deletes)  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Best-effort handler failures are logged and collected in the
//! [`PublishOutcome`]; a mandatory failure aborts the publish with
//! [`DispatchError::MandatoryHandlerFailed`] and the lifecycle service
//! leaves the mutation unapplied.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod error;
pub mod events;
pub mod handlers;
pub mod hub;
pub mod lifecycle;

// Re-exports for public API
pub use error::{DispatchError, HandlerError, LifecycleError};
pub use events::{ChangeEvent, EventKind};
pub use handlers::{CleanupHandler, HistoryHandler, NotificationHandler};
pub use hub::{
    FailurePolicy, HandlerFailure, PublishOutcome, SignalHandler, SignalHub, SignalHubBuilder,
};
pub use lifecycle::MessagingLifecycle;
