//! Storage ports.
//!
//! The handlers and the lifecycle service depend on these traits, never on a
//! concrete backend. [`crate::memory::MemoryStore`] implements all of them;
//! tests substitute partial mocks where a scenario needs a failing port.

use crate::error::StoreError;
use async_trait::async_trait;
use shared_types::{
    Conversation, ConversationId, Message, MessageHistory, MessageId, Notification,
    NotificationId, User, UserId,
};

/// What a cascading message delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    /// Messages removed (the target plus its reply subtree)
    pub messages: usize,
    /// History rows removed alongside those messages
    pub history_rows: usize,
    /// Notifications removed because they referenced those messages
    pub notifications: usize,
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;

    /// Fetch a user by id.
    async fn user(&self, id: UserId) -> Result<User, StoreError>;

    /// Remove a user row. The caller is responsible for publishing the
    /// deletion event; this only drops the row itself.
    async fn delete_user(&self, id: UserId) -> Result<(), StoreError>;
}

/// Conversations and their participant lists.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert a conversation.
    async fn insert_conversation(&self, conversation: Conversation) -> Result<(), StoreError>;

    /// Fetch a conversation by id.
    async fn conversation(&self, id: ConversationId) -> Result<Conversation, StoreError>;

    /// Conversations the user takes part in, most recently updated first.
    async fn conversations_for(&self, user: UserId) -> Result<Vec<Conversation>, StoreError>;
}

/// Messages, including the threaded-reply invariants and the cascade.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a message.
    ///
    /// Enforces the reply invariants: the conversation must exist, and a
    /// parent (when present) must exist and belong to the same conversation.
    async fn insert_message(&self, message: Message) -> Result<(), StoreError>;

    /// Fetch a message by id.
    async fn message(&self, id: MessageId) -> Result<Message, StoreError>;

    /// All messages of a conversation in stable chronological order.
    async fn conversation_messages(&self, id: ConversationId) -> Result<Vec<Message>, StoreError>;

    /// All messages sent by a user, in stable chronological order.
    async fn messages_by_sender(&self, sender: UserId) -> Result<Vec<Message>, StoreError>;

    /// Overwrite a message body.
    ///
    /// Sets the `edited` flag only when the body actually changed; an update
    /// to the same content leaves the row untouched. Returns the row as
    /// persisted.
    async fn apply_update(&self, id: MessageId, new_body: &str) -> Result<Message, StoreError>;

    /// Record that `reader` has read the message.
    async fn mark_read(&self, id: MessageId, reader: UserId) -> Result<(), StoreError>;

    /// Unread messages for a user: sent by someone else into one of the
    /// user's conversations and not yet marked read, newest first.
    async fn unread_for(&self, user: UserId) -> Result<Vec<Message>, StoreError>;

    /// Resolve the root of the reply thread containing `id`.
    ///
    /// Walks `parent_id` upward iteratively; the walk is bounded by the
    /// number of stored messages.
    async fn thread_root(&self, id: MessageId) -> Result<MessageId, StoreError>;

    /// Delete a message together with its reply subtree, the history rows of
    /// those messages, and the notifications referencing them.
    ///
    /// Deleting a message that is already gone reports zero removals rather
    /// than failing.
    async fn delete_message_cascading(&self, id: MessageId) -> Result<CascadeReport, StoreError>;
}

/// Per-recipient notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert a notification.
    async fn insert_notification(&self, notification: Notification) -> Result<(), StoreError>;

    /// Whether a notification already exists for this (message, recipient)
    /// pair.
    async fn exists_for(&self, message: MessageId, recipient: UserId) -> Result<bool, StoreError>;

    /// Notifications owned by a user, newest first.
    async fn notifications_for(&self, user: UserId) -> Result<Vec<Notification>, StoreError>;

    /// Mark a notification as read.
    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), StoreError>;

    /// Remove every notification owned by a user. Returns how many were
    /// removed; zero is not an error.
    async fn delete_notifications_for_user(&self, user: UserId) -> Result<usize, StoreError>;
}

/// Append-only message edit history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a history row.
    async fn insert_history(&self, entry: MessageHistory) -> Result<(), StoreError>;

    /// History rows for a message, newest first.
    async fn history_for(&self, message: MessageId) -> Result<Vec<MessageHistory>, StoreError>;
}
