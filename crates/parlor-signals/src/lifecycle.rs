//! Mutation entry points that publish around persistence.
//!
//! The ordering here is the contract: creates and deletes commit first and
//! publish after, updates publish first so the history capture sees the
//! pre-edit content and can veto the write.

use crate::error::LifecycleError;
use crate::events::ChangeEvent;
use crate::hub::SignalHub;
use parlor_store::{MessageStore, UserStore};
use shared_types::{Message, MessageId, UserId};
use std::sync::Arc;
use tracing::debug;

/// Message and user mutations wired to the signal hub.
pub struct MessagingLifecycle {
    users: Arc<dyn UserStore>,
    messages: Arc<dyn MessageStore>,
    hub: Arc<SignalHub>,
}

impl MessagingLifecycle {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        messages: Arc<dyn MessageStore>,
        hub: Arc<SignalHub>,
    ) -> Self {
        Self {
            users,
            messages,
            hub,
        }
    }

    /// Persist a new message, then announce it.
    ///
    /// Best-effort reaction failures (for example notification fan-out) are
    /// logged by the hub and do not undo the insert.
    pub async fn create_message(&self, message: Message) -> Result<Message, LifecycleError> {
        self.messages.insert_message(message.clone()).await?;
        debug!(message = %message.id, conversation = %message.conversation_id, "message created");
        self.hub
            .publish(&ChangeEvent::MessageCreated {
                message: message.clone(),
            })
            .await
            .map_err(LifecycleError::Dispatch)?;
        Ok(message)
    }

    /// Replace a message's body, capturing history first.
    ///
    /// The `MessageUpdating` publish runs before the write; if the mandatory
    /// history capture fails, the update is aborted and the stored message
    /// is untouched. `edited` flips only when the body actually changed.
    pub async fn update_message(
        &self,
        message_id: MessageId,
        new_body: impl Into<String>,
        edited_by: UserId,
    ) -> Result<Message, LifecycleError> {
        let proposed_body = new_body.into();
        self.hub
            .publish(&ChangeEvent::MessageUpdating {
                message_id,
                proposed_body: proposed_body.clone(),
                edited_by,
            })
            .await
            .map_err(LifecycleError::HistoryCapture)?;

        let updated = self.messages.apply_update(message_id, &proposed_body).await?;
        debug!(message = %message_id, edited = updated.edited, "message updated");
        Ok(updated)
    }

    /// Remove a user, then announce it so cleanup can run.
    ///
    /// The row is gone even if cleanup reactions fail; those failures are
    /// best-effort and surface in logs.
    pub async fn delete_user(&self, user_id: UserId) -> Result<(), LifecycleError> {
        let user = self.users.user(user_id).await?;
        self.users.delete_user(user_id).await?;
        debug!(user = %user_id, "user deleted");
        self.hub
            .publish(&ChangeEvent::UserDeleted { user })
            .await
            .map_err(LifecycleError::Dispatch)?;
        Ok(())
    }
}
