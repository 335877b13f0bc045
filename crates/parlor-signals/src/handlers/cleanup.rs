//! User data cleanup on deletion.

use crate::error::HandlerError;
use crate::events::ChangeEvent;
use crate::hub::SignalHandler;
use async_trait::async_trait;
use parlor_store::{MessageStore, NotificationStore};
use shared_types::User;
use std::sync::Arc;
use tracing::{debug, warn};

/// Removes what a deleted user left behind.
///
/// Two categories run in order: messages the user sent (each removed with
/// the cascading delete, which also takes the reply subtree, history rows,
/// and notifications tied to those messages), then notifications owned by
/// the user. Best-effort: a failed step is logged and counted but does not
/// stop the remaining steps or the user deletion itself. Rows already gone
/// count as cleaned.
pub struct CleanupHandler {
    messages: Arc<dyn MessageStore>,
    notifications: Arc<dyn NotificationStore>,
}

impl CleanupHandler {
    #[must_use]
    pub fn new(
        messages: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        Self {
            messages,
            notifications,
        }
    }

    async fn sweep(&self, user: &User) -> Result<(), HandlerError> {
        let mut failed_steps = 0usize;

        match self.messages.messages_by_sender(user.id).await {
            Ok(sent) => {
                for message in sent {
                    // A reply already taken by an earlier cascade reports zero
                    match self.messages.delete_message_cascading(message.id).await {
                        Ok(report) => {
                            debug!(
                                message = %message.id,
                                removed = report.messages,
                                "sent message cleaned"
                            );
                        }
                        Err(error) => {
                            warn!(message = %message.id, error = %error, "message cleanup failed");
                            failed_steps += 1;
                        }
                    }
                }
            }
            Err(error) => {
                warn!(user = %user.id, error = %error, "could not list sent messages");
                failed_steps += 1;
            }
        }

        match self.notifications.delete_notifications_for_user(user.id).await {
            Ok(removed) => debug!(user = %user.id, removed, "notifications cleaned"),
            Err(error) => {
                warn!(user = %user.id, error = %error, "notification cleanup failed");
                failed_steps += 1;
            }
        }

        if failed_steps == 0 {
            Ok(())
        } else {
            Err(HandlerError::failed(format!(
                "{failed_steps} cleanup steps failed for user {}",
                user.id
            )))
        }
    }
}

#[async_trait]
impl SignalHandler for CleanupHandler {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    async fn handle(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        if let ChangeEvent::UserDeleted { user } = event {
            self.sweep(user).await?;
        }
        Ok(())
    }
}
