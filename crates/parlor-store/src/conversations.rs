//! Cached read path for threaded conversations.
//!
//! Fetches go through a [`QueryCache`] keyed by conversation id, so repeat
//! reads inside the time-to-live window skip the store entirely. Writers
//! call [`ConversationThreads::invalidate`] after touching a conversation's
//! messages; otherwise staleness is bounded by the cache window.

use crate::error::StoreError;
use crate::ports::{ConversationStore, MessageStore};
use crate::query_cache::QueryCache;
use crate::threads::{self, ThreadedConversation};
use shared_types::ConversationId;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type ThreadCache = QueryCache<ConversationId, ThreadedConversation>;

/// Conversation reads with thread assembly and short-lived caching.
pub struct ConversationThreads {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    cache: ThreadCache,
}

impl ConversationThreads {
    /// Read path with the default cache window.
    #[must_use]
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self::with_ttl(conversations, messages, ThreadCache::DEFAULT_TTL)
    }

    /// Read path with a caller-chosen cache window.
    #[must_use]
    pub fn with_ttl(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            conversations,
            messages,
            cache: QueryCache::with_ttl(ttl),
        }
    }

    /// The conversation and its reply trees, served from cache when fresh.
    ///
    /// Store errors propagate uncached, so a failed fetch retries on the
    /// next call.
    pub async fn threads(
        &self,
        id: ConversationId,
    ) -> Result<Arc<ThreadedConversation>, StoreError> {
        let conversations = Arc::clone(&self.conversations);
        let messages = Arc::clone(&self.messages);
        self.cache
            .get_with(id, move || async move {
                debug!(conversation = %id, "assembling threads");
                let conversation = conversations.conversation(id).await?;
                let ordered = messages.conversation_messages(id).await?;
                Ok(ThreadedConversation {
                    conversation,
                    roots: threads::assemble(&ordered),
                })
            })
            .await
    }

    /// Drop the cached view after a write touches the conversation.
    pub fn invalidate(&self, id: ConversationId) -> bool {
        self.cache.invalidate(&id)
    }

    /// Sweep expired views out of the cache.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
