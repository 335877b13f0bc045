//! The concrete reactions registered on the hub.
//!
//! - [`NotificationHandler`]: `MessageCreated`, best-effort fan-out.
//! - [`HistoryHandler`]: `MessageUpdating`, mandatory pre-update capture.
//! - [`CleanupHandler`]: `UserDeleted`, best-effort category deletes.

pub mod cleanup;
pub mod history;
pub mod notification;

pub use cleanup::CleanupHandler;
pub use history::HistoryHandler;
pub use notification::NotificationHandler;
