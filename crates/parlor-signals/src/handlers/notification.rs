//! Notification fan-out on message creation.

use crate::error::HandlerError;
use crate::events::ChangeEvent;
use crate::hub::SignalHandler;
use async_trait::async_trait;
use parlor_store::{ConversationStore, NotificationStore, StoreError, UserStore};
use shared_types::{Message, Notification};
use std::sync::Arc;
use tracing::debug;

/// Creates one notification per conversation participant other than the
/// sender. Idempotent: a (message, recipient) pair that already has a
/// notification is skipped, so replaying the event cannot double-notify.
pub struct NotificationHandler {
    users: Arc<dyn UserStore>,
    conversations: Arc<dyn ConversationStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl NotificationHandler {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        conversations: Arc<dyn ConversationStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            users,
            conversations,
            notifications,
        }
    }

    async fn fan_out(&self, message: &Message) -> Result<(), HandlerError> {
        // A sender or conversation that vanished between the insert and the
        // publish means there is nobody to notify; not a failure.
        let sender = match self.users.user(message.sender_id).await {
            Ok(sender) => sender,
            Err(StoreError::UserNotFound(id)) => {
                debug!(user = %id, "sender gone, skipping notifications");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let conversation = match self.conversations.conversation(message.conversation_id).await {
            Ok(conversation) => conversation,
            Err(StoreError::ConversationNotFound(id)) => {
                debug!(conversation = %id, "conversation gone, skipping notifications");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };

        for recipient in conversation.participant_ids.iter().copied() {
            if recipient == message.sender_id {
                continue;
            }
            if self.notifications.exists_for(message.id, recipient).await? {
                debug!(
                    message = %message.id,
                    recipient = %recipient,
                    "notification already present"
                );
                continue;
            }
            self.notifications
                .insert_notification(Notification::new(
                    recipient,
                    message.id,
                    format!("You have a new message from {}", sender.username),
                ))
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SignalHandler for NotificationHandler {
    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn handle(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        if let ChangeEvent::MessageCreated { message } = event {
            self.fan_out(message).await?;
        }
        Ok(())
    }
}
