//! Pre-update history capture.

use crate::error::HandlerError;
use crate::events::ChangeEvent;
use crate::hub::{FailurePolicy, SignalHandler};
use async_trait::async_trait;
use parlor_store::{HistoryStore, MessageStore};
use shared_types::{MessageHistory, MessageId, UserId};
use std::sync::Arc;
use tracing::debug;

/// Records the current body of a message before an edit overwrites it.
///
/// Mandatory: if the current content cannot be read, the publish fails and
/// the lifecycle service leaves the update unapplied, so no edit can land
/// without its history row. Runs before `apply_update`, which is the only
/// ordering under which the captured body is the pre-edit one.
pub struct HistoryHandler {
    messages: Arc<dyn MessageStore>,
    history: Arc<dyn HistoryStore>,
}

impl HistoryHandler {
    #[must_use]
    pub fn new(messages: Arc<dyn MessageStore>, history: Arc<dyn HistoryStore>) -> Self {
        Self { messages, history }
    }

    async fn capture(
        &self,
        message_id: MessageId,
        proposed_body: &str,
        edited_by: UserId,
    ) -> Result<(), HandlerError> {
        let current = self.messages.message(message_id).await?;
        if current.body == proposed_body {
            debug!(message = %message_id, "content unchanged, no history row");
            return Ok(());
        }
        self.history
            .insert_history(MessageHistory::new(message_id, current.body, edited_by))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SignalHandler for HistoryHandler {
    fn name(&self) -> &'static str {
        "history_capture"
    }

    fn policy(&self) -> FailurePolicy {
        FailurePolicy::Mandatory
    }

    async fn handle(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        if let ChangeEvent::MessageUpdating {
            message_id,
            proposed_body,
            edited_by,
        } = event
        {
            self.capture(*message_id, proposed_body, *edited_by).await?;
        }
        Ok(())
    }
}
