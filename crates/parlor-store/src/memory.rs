//! In-memory storage backend.
//!
//! Rows live in `DashMap` tables so independent operations proceed without a
//! global lock. Every row carries an insertion sequence number; orderings
//! sort on `(timestamp, seq)` so rows created in the same instant keep a
//! stable, insertion-faithful order.

use crate::error::StoreError;
use crate::ports::{
    CascadeReport, ConversationStore, HistoryStore, MessageStore, NotificationStore, UserStore,
};
use async_trait::async_trait;
use dashmap::DashMap;
use shared_types::{
    Conversation, ConversationId, HistoryId, Message, MessageHistory, MessageId, Notification,
    NotificationId, User, UserId,
};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A stored row plus its insertion sequence number.
struct Sequenced<T> {
    row: T,
    seq: u64,
}

/// In-memory backend implementing every storage port.
///
/// Not persisted across restarts; the process owns all state.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    conversations: DashMap<ConversationId, Sequenced<Conversation>>,
    messages: DashMap<MessageId, Sequenced<Message>>,
    notifications: DashMap<NotificationId, Sequenced<Notification>>,
    history: DashMap<HistoryId, Sequenced<MessageHistory>>,
    next_seq: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Ids of the message and every transitive reply under it.
    ///
    /// Breadth-first over a parent → children adjacency map built in one
    /// pass; no recursion.
    fn reply_subtree(&self, root: MessageId) -> HashSet<MessageId> {
        let mut children: HashMap<MessageId, Vec<MessageId>> = HashMap::new();
        for entry in self.messages.iter() {
            if let Some(parent) = entry.value().row.parent_id {
                children.entry(parent).or_default().push(*entry.key());
            }
        }

        let mut subtree = HashSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if !subtree.insert(current) {
                continue;
            }
            if let Some(kids) = children.get(&current) {
                queue.extend(kids.iter().copied());
            }
        }
        subtree
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn user(&self, id: UserId) -> Result<User, StoreError> {
        self.users
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::UserNotFound(id))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UserNotFound(id))
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn insert_conversation(&self, conversation: Conversation) -> Result<(), StoreError> {
        let seq = self.next_seq();
        self.conversations.insert(
            conversation.id,
            Sequenced {
                row: conversation,
                seq,
            },
        );
        Ok(())
    }

    async fn conversation(&self, id: ConversationId) -> Result<Conversation, StoreError> {
        self.conversations
            .get(&id)
            .map(|entry| entry.row.clone())
            .ok_or(StoreError::ConversationNotFound(id))
    }

    async fn conversations_for(&self, user: UserId) -> Result<Vec<Conversation>, StoreError> {
        let mut rows: Vec<_> = self
            .conversations
            .iter()
            .filter(|entry| entry.row.has_participant(user))
            .map(|entry| (entry.row.updated_at, entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(updated_at, seq, _)| Reverse((*updated_at, *seq)));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, message: Message) -> Result<(), StoreError> {
        if !self.conversations.contains_key(&message.conversation_id) {
            return Err(StoreError::ConversationNotFound(message.conversation_id));
        }
        if let Some(parent_id) = message.parent_id {
            let parent = self
                .messages
                .get(&parent_id)
                .ok_or(StoreError::ParentNotFound(parent_id))?;
            if parent.row.conversation_id != message.conversation_id {
                return Err(StoreError::ParentConversationMismatch(parent_id));
            }
        }

        let seq = self.next_seq();
        self.messages.insert(message.id, Sequenced { row: message, seq });
        Ok(())
    }

    async fn message(&self, id: MessageId) -> Result<Message, StoreError> {
        self.messages
            .get(&id)
            .map(|entry| entry.row.clone())
            .ok_or(StoreError::MessageNotFound(id))
    }

    async fn conversation_messages(
        &self,
        id: ConversationId,
    ) -> Result<Vec<Message>, StoreError> {
        let mut rows: Vec<_> = self
            .messages
            .iter()
            .filter(|entry| entry.row.conversation_id == id)
            .map(|entry| (entry.row.created_at, entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(created_at, seq, _)| (*created_at, *seq));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    async fn messages_by_sender(&self, sender: UserId) -> Result<Vec<Message>, StoreError> {
        let mut rows: Vec<_> = self
            .messages
            .iter()
            .filter(|entry| entry.row.sender_id == sender)
            .map(|entry| (entry.row.created_at, entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(created_at, seq, _)| (*created_at, *seq));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    async fn apply_update(&self, id: MessageId, new_body: &str) -> Result<Message, StoreError> {
        let mut entry = self
            .messages
            .get_mut(&id)
            .ok_or(StoreError::MessageNotFound(id))?;
        if entry.row.body != new_body {
            entry.row.body = new_body.to_string();
            entry.row.edited = true;
        }
        Ok(entry.row.clone())
    }

    async fn mark_read(&self, id: MessageId, reader: UserId) -> Result<(), StoreError> {
        let mut entry = self
            .messages
            .get_mut(&id)
            .ok_or(StoreError::MessageNotFound(id))?;
        entry.row.read_by.insert(reader);
        Ok(())
    }

    async fn unread_for(&self, user: UserId) -> Result<Vec<Message>, StoreError> {
        let member_of: HashSet<ConversationId> = self
            .conversations
            .iter()
            .filter(|entry| entry.row.has_participant(user))
            .map(|entry| *entry.key())
            .collect();

        let mut rows: Vec<_> = self
            .messages
            .iter()
            .filter(|entry| {
                let message = &entry.row;
                member_of.contains(&message.conversation_id)
                    && message.sender_id != user
                    && !message.read_by.contains(&user)
            })
            .map(|entry| (entry.row.created_at, entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(created_at, seq, _)| Reverse((*created_at, *seq)));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    async fn thread_root(&self, id: MessageId) -> Result<MessageId, StoreError> {
        let mut current = self.message(id).await?;
        // Parent chains cannot cycle, but bound the walk anyway
        let limit = self.messages.len();
        let mut hops = 0usize;
        while let Some(parent_id) = current.parent_id {
            if hops >= limit {
                break;
            }
            match self.messages.get(&parent_id) {
                Some(parent) => current = parent.row.clone(),
                None => break,
            }
            hops += 1;
        }
        Ok(current.id)
    }

    async fn delete_message_cascading(
        &self,
        id: MessageId,
    ) -> Result<CascadeReport, StoreError> {
        if !self.messages.contains_key(&id) {
            return Ok(CascadeReport::default());
        }

        let doomed = self.reply_subtree(id);

        let mut report = CascadeReport::default();
        for message_id in &doomed {
            if self.messages.remove(message_id).is_some() {
                report.messages += 1;
            }
        }
        self.history.retain(|_, entry| {
            if doomed.contains(&entry.row.message_id) {
                report.history_rows += 1;
                false
            } else {
                true
            }
        });
        self.notifications.retain(|_, entry| {
            if doomed.contains(&entry.row.message_id) {
                report.notifications += 1;
                false
            } else {
                true
            }
        });

        debug!(
            message = %id,
            messages = report.messages,
            history_rows = report.history_rows,
            notifications = report.notifications,
            "cascaded message delete"
        );
        Ok(report)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> Result<(), StoreError> {
        let seq = self.next_seq();
        self.notifications.insert(
            notification.id,
            Sequenced {
                row: notification,
                seq,
            },
        );
        Ok(())
    }

    async fn exists_for(
        &self,
        message: MessageId,
        recipient: UserId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .notifications
            .iter()
            .any(|entry| entry.row.message_id == message && entry.row.user_id == recipient))
    }

    async fn notifications_for(&self, user: UserId) -> Result<Vec<Notification>, StoreError> {
        let mut rows: Vec<_> = self
            .notifications
            .iter()
            .filter(|entry| entry.row.user_id == user)
            .map(|entry| (entry.row.created_at, entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(created_at, seq, _)| Reverse((*created_at, *seq)));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }

    async fn mark_notification_read(&self, id: NotificationId) -> Result<(), StoreError> {
        let mut entry = self
            .notifications
            .get_mut(&id)
            .ok_or(StoreError::NotificationNotFound)?;
        entry.row.read = true;
        Ok(())
    }

    async fn delete_notifications_for_user(&self, user: UserId) -> Result<usize, StoreError> {
        let mut removed = 0usize;
        self.notifications.retain(|_, entry| {
            if entry.row.user_id == user {
                removed += 1;
                false
            } else {
                true
            }
        });
        Ok(removed)
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn insert_history(&self, entry: MessageHistory) -> Result<(), StoreError> {
        let seq = self.next_seq();
        self.history.insert(entry.id, Sequenced { row: entry, seq });
        Ok(())
    }

    async fn history_for(&self, message: MessageId) -> Result<Vec<MessageHistory>, StoreError> {
        let mut rows: Vec<_> = self
            .history
            .iter()
            .filter(|entry| entry.row.message_id == message)
            .map(|entry| (entry.row.edited_at, entry.seq, entry.row.clone()))
            .collect();
        rows.sort_by_key(|(edited_at, seq, _)| Reverse((*edited_at, *seq)));
        Ok(rows.into_iter().map(|(_, _, row)| row).collect())
    }
}
