//! Storage error types.

use shared_types::{ConversationId, MessageId, UserId};

/// Errors returned by the storage ports
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No user with this id
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// No conversation with this id
    #[error("conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    /// No message with this id
    #[error("message not found: {0}")]
    MessageNotFound(MessageId),

    /// A reply referenced a parent that does not exist
    #[error("parent message not found: {0}")]
    ParentNotFound(MessageId),

    /// A reply referenced a parent in a different conversation
    #[error("parent message {0} belongs to a different conversation")]
    ParentConversationMismatch(MessageId),

    /// No notification with this id
    #[error("notification not found")]
    NotificationNotFound,
}
