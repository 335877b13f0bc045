//! # Lifecycle Events
//!
//! Typed events published around entity mutations. Each event carries the
//! state a handler needs so handlers never reach back into the mutation's
//! own call frame.

use serde::{Deserialize, Serialize};
use shared_types::{Message, MessageId, User, UserId};
use uuid::Uuid;

/// All events the signal hub can deliver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChangeEvent {
    /// A message row was persisted. Published after the insert commits.
    MessageCreated {
        /// The message as stored.
        message: Message,
    },

    /// A message is about to be overwritten. Published before the update is
    /// applied, so handlers still see the current persisted content.
    MessageUpdating {
        /// The message being edited.
        message_id: MessageId,
        /// The content that will replace the current body.
        proposed_body: String,
        /// Who is making the edit.
        edited_by: UserId,
    },

    /// A user row was removed. Published after the delete commits.
    UserDeleted {
        /// The user as they were stored before deletion.
        user: User,
    },
}

impl ChangeEvent {
    /// Dispatch key used to look up registered handlers.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MessageCreated { .. } => EventKind::MessageCreated,
            Self::MessageUpdating { .. } => EventKind::MessageUpdating,
            Self::UserDeleted { .. } => EventKind::UserDeleted,
        }
    }

    /// Id of the entity at the center of the event.
    #[must_use]
    pub fn entity_id(&self) -> Uuid {
        match self {
            Self::MessageCreated { message } => message.id.0,
            Self::MessageUpdating { message_id, .. } => message_id.0,
            Self::UserDeleted { user } => user.id.0,
        }
    }
}

/// Registration key for handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A new message was stored.
    MessageCreated,
    /// A message body is about to change.
    MessageUpdating,
    /// A user was removed.
    UserDeleted,
}
