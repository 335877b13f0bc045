//! # Cached Read Path
//!
//! Exercises `ConversationThreads` against the live store: staleness inside
//! the time-to-live window, the invalidate-after-write flow the resource
//! handlers use, and thread assembly on deep reply chains.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parlor_signals::{MessagingLifecycle, SignalHub};
    use parlor_store::{
        ConversationStore, ConversationThreads, MemoryStore, MessageStore, StoreError, UserStore,
    };
    use shared_types::{Conversation, ConversationId, Message, Role, User};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    async fn seeded() -> (Arc<MemoryStore>, ConversationId, User) {
        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice", "alice@example.com", Role::Member);
        store.insert_user(alice.clone()).await.unwrap();
        let conversation = Conversation::new("reading list", vec![alice.id]);
        let convo = conversation.id;
        store.insert_conversation(conversation).await.unwrap();
        (store, convo, alice)
    }

    // =============================================================================
    // STALENESS AND INVALIDATION
    // =============================================================================

    #[tokio::test]
    async fn test_view_is_served_stale_until_invalidated() {
        let (store, convo, alice) = seeded().await;
        store
            .insert_message(Message::new(convo, alice.id, "root"))
            .await
            .unwrap();
        let reads = ConversationThreads::new(store.clone(), store.clone());

        assert_eq!(reads.threads(convo).await.unwrap().total_messages(), 1);

        // A write lands but the cached view keeps serving inside the window
        store
            .insert_message(Message::new(convo, alice.id, "root two"))
            .await
            .unwrap();
        assert_eq!(reads.threads(convo).await.unwrap().total_messages(), 1);

        assert!(reads.invalidate(convo));
        assert_eq!(reads.threads(convo).await.unwrap().total_messages(), 2);
    }

    #[tokio::test]
    async fn test_write_then_invalidate_flow_shows_fresh_view() {
        // The resource handler's sequence: mutate, invalidate, re-read
        let (store, convo, alice) = seeded().await;
        let hub = Arc::new(SignalHub::builder().build());
        let lifecycle = MessagingLifecycle::new(store.clone(), store.clone(), hub);
        let reads = ConversationThreads::new(store.clone(), store.clone());

        assert_eq!(reads.threads(convo).await.unwrap().total_messages(), 0);

        let created = lifecycle
            .create_message(Message::new(convo, alice.id, "announcement"))
            .await
            .unwrap();
        reads.invalidate(convo);

        let view = reads.threads(convo).await.unwrap();
        assert_eq!(view.total_messages(), 1);
        assert_eq!(view.roots[0].message.id, created.id);
    }

    #[tokio::test]
    async fn test_expired_entries_recompute_and_purge() {
        let (store, convo, alice) = seeded().await;
        store
            .insert_message(Message::new(convo, alice.id, "root"))
            .await
            .unwrap();
        let reads = ConversationThreads::with_ttl(store.clone(), store.clone(), Duration::ZERO);

        assert_eq!(reads.threads(convo).await.unwrap().total_messages(), 1);
        store
            .insert_message(Message::new(convo, alice.id, "another"))
            .await
            .unwrap();
        assert_eq!(reads.threads(convo).await.unwrap().total_messages(), 2);

        assert_eq!(reads.purge_expired(), 1);
    }

    #[tokio::test]
    async fn test_missing_conversation_error_is_retried_not_cached() {
        let store = Arc::new(MemoryStore::new());
        let reads = ConversationThreads::new(store.clone(), store.clone());
        let convo = ConversationId::new();

        assert!(matches!(
            reads.threads(convo).await,
            Err(StoreError::ConversationNotFound(_))
        ));

        let mut conversation = Conversation::new("late", vec![]);
        conversation.id = convo;
        store.insert_conversation(conversation).await.unwrap();
        assert!(reads.threads(convo).await.is_ok());
    }

    // =============================================================================
    // THREAD ASSEMBLY THROUGH THE STORE
    // =============================================================================

    #[tokio::test]
    async fn test_branching_threads_keep_chronological_shape() {
        let (store, convo, alice) = seeded().await;

        let root_a = Message::new(convo, alice.id, "root a");
        let root_a_id = root_a.id;
        store.insert_message(root_a).await.unwrap();
        let reply_one = Message::new(convo, alice.id, "reply one").with_parent(root_a_id);
        let reply_one_id = reply_one.id;
        store.insert_message(reply_one).await.unwrap();
        let nested = Message::new(convo, alice.id, "nested").with_parent(reply_one_id);
        store.insert_message(nested).await.unwrap();
        let root_b = Message::new(convo, alice.id, "root b");
        store.insert_message(root_b).await.unwrap();

        let reads = ConversationThreads::new(store.clone(), store.clone());
        let view = reads.threads(convo).await.unwrap();

        assert_eq!(view.roots.len(), 2);
        assert_eq!(view.roots[0].message.body, "root a");
        assert_eq!(view.roots[1].message.body, "root b");
        assert_eq!(view.roots[0].replies.len(), 1);
        assert_eq!(view.roots[0].replies[0].message.body, "reply one");
        assert_eq!(
            view.roots[0].replies[0].replies[0].message.body,
            "nested"
        );
        assert_eq!(view.total_messages(), 4);
    }

    #[tokio::test]
    async fn test_deep_reply_chain_assembles_and_resolves_its_root() {
        let (store, convo, alice) = seeded().await;

        let root = Message::new(convo, alice.id, "root");
        let root_id = root.id;
        store.insert_message(root).await.unwrap();

        let mut parent = root_id;
        for depth in 1..=300 {
            let reply =
                Message::new(convo, alice.id, format!("depth {depth}")).with_parent(parent);
            parent = reply.id;
            store.insert_message(reply).await.unwrap();
        }
        let leaf = parent;

        let reads = ConversationThreads::new(store.clone(), store.clone());
        let view = reads.threads(convo).await.unwrap();
        assert_eq!(view.total_messages(), 301);

        // Walk down iteratively and confirm the chain is intact
        let mut depth = 0usize;
        let mut node = &view.roots[0];
        while let Some(next) = node.replies.first() {
            depth += 1;
            node = next;
        }
        assert_eq!(depth, 300);
        assert_eq!(node.message.id, leaf);

        assert_eq!(store.thread_root(leaf).await.unwrap(), root_id);
    }
}
