//! # Signal Dispatch Flows
//!
//! Exercises the lifecycle service with the real handlers registered, the
//! way the resource layer wires them at startup:
//!
//! 1. **MessageCreated → NotificationHandler**: fan-out, exactly once
//! 2. **MessageUpdating → HistoryHandler**: capture before apply, veto power
//! 3. **UserDeleted → CleanupHandler**: cascading sweep, isolation

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use parlor_signals::{
        ChangeEvent, CleanupHandler, EventKind, HandlerError, HistoryHandler, LifecycleError,
        MessagingLifecycle, NotificationHandler, SignalHandler, SignalHub,
    };
    use parlor_store::{
        ConversationStore, HistoryStore, MemoryStore, MessageStore, NotificationStore, UserStore,
    };
    use shared_types::{Conversation, ConversationId, Message, MessageId, Role, User, UserId};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct World {
        store: Arc<MemoryStore>,
        lifecycle: MessagingLifecycle,
        alice: User,
        bob: User,
        convo: ConversationId,
    }

    /// Store, hub with all three production handlers, and the lifecycle.
    async fn world() -> World {
        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice", "alice@example.com", Role::Member);
        let bob = User::new("bob", "bob@example.com", Role::Member);
        store.insert_user(alice.clone()).await.unwrap();
        store.insert_user(bob.clone()).await.unwrap();
        let conversation = Conversation::new("standup", vec![alice.id, bob.id]);
        let convo = conversation.id;
        store.insert_conversation(conversation).await.unwrap();

        let hub = Arc::new(
            SignalHub::builder()
                .register(
                    EventKind::MessageCreated,
                    Arc::new(NotificationHandler::new(
                        store.clone(),
                        store.clone(),
                        store.clone(),
                    )),
                )
                .register(
                    EventKind::MessageUpdating,
                    Arc::new(HistoryHandler::new(store.clone(), store.clone())),
                )
                .register(
                    EventKind::UserDeleted,
                    Arc::new(CleanupHandler::new(store.clone(), store.clone())),
                )
                .build(),
        );
        let lifecycle = MessagingLifecycle::new(store.clone(), store.clone(), hub);
        World {
            store,
            lifecycle,
            alice,
            bob,
            convo,
        }
    }

    /// Records what the notification table held when this handler ran.
    struct InboxProbe {
        name: &'static str,
        watching: UserId,
        notifications: Arc<dyn NotificationStore>,
        seen: Arc<Mutex<Vec<(&'static str, usize)>>>,
    }

    #[async_trait]
    impl SignalHandler for InboxProbe {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, _event: &ChangeEvent) -> Result<(), HandlerError> {
            let count = self
                .notifications
                .notifications_for(self.watching)
                .await?
                .len();
            self.seen.lock().unwrap().push((self.name, count));
            Ok(())
        }
    }

    // =============================================================================
    // MESSAGE CREATED → NOTIFICATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_created_message_notifies_the_other_participant_once() {
        let w = world().await;

        w.lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "morning"))
            .await
            .unwrap();

        let inbox = w.store.notifications_for(w.bob.id).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].content, "You have a new message from alice");
        assert!(w.store.notifications_for(w.alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_two_messages_mean_two_notifications_not_four() {
        let w = world().await;

        w.lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "first"))
            .await
            .unwrap();
        w.lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "second"))
            .await
            .unwrap();

        assert_eq!(w.store.notifications_for(w.bob.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_registration_order_is_observable_between_handlers() {
        // Probes sandwich the notification handler: the one registered
        // before it sees an empty inbox, the one after sees the fan-out.
        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice", "alice@example.com", Role::Member);
        let bob = User::new("bob", "bob@example.com", Role::Member);
        store.insert_user(alice.clone()).await.unwrap();
        store.insert_user(bob.clone()).await.unwrap();
        let conversation = Conversation::new("standup", vec![alice.id, bob.id]);
        let convo = conversation.id;
        store.insert_conversation(conversation).await.unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let hub = SignalHub::builder()
            .register(
                EventKind::MessageCreated,
                Arc::new(InboxProbe {
                    name: "before",
                    watching: bob.id,
                    notifications: store.clone(),
                    seen: seen.clone(),
                }),
            )
            .register(
                EventKind::MessageCreated,
                Arc::new(NotificationHandler::new(
                    store.clone(),
                    store.clone(),
                    store.clone(),
                )),
            )
            .register(
                EventKind::MessageCreated,
                Arc::new(InboxProbe {
                    name: "after",
                    watching: bob.id,
                    notifications: store.clone(),
                    seen: seen.clone(),
                }),
            )
            .build();
        assert_eq!(
            hub.handler_names(EventKind::MessageCreated),
            vec!["before", "notifications", "after"]
        );

        let message = Message::new(convo, alice.id, "ping");
        store.insert_message(message.clone()).await.unwrap();
        let outcome = hub
            .publish(&ChangeEvent::MessageCreated { message })
            .await
            .unwrap();

        assert_eq!(outcome.delivered, 3);
        assert_eq!(*seen.lock().unwrap(), vec![("before", 0), ("after", 1)]);
    }

    #[tokio::test]
    async fn test_failing_first_handler_does_not_starve_the_fanout() {
        struct AlwaysFails;

        #[async_trait]
        impl SignalHandler for AlwaysFails {
            fn name(&self) -> &'static str {
                "always_fails"
            }

            async fn handle(&self, _event: &ChangeEvent) -> Result<(), HandlerError> {
                Err(HandlerError::failed("induced"))
            }
        }

        let store = Arc::new(MemoryStore::new());
        let alice = User::new("alice", "alice@example.com", Role::Member);
        let bob = User::new("bob", "bob@example.com", Role::Member);
        store.insert_user(alice.clone()).await.unwrap();
        store.insert_user(bob.clone()).await.unwrap();
        let conversation = Conversation::new("standup", vec![alice.id, bob.id]);
        let convo = conversation.id;
        store.insert_conversation(conversation).await.unwrap();

        let hub = SignalHub::builder()
            .register(EventKind::MessageCreated, Arc::new(AlwaysFails))
            .register(
                EventKind::MessageCreated,
                Arc::new(NotificationHandler::new(
                    store.clone(),
                    store.clone(),
                    store.clone(),
                )),
            )
            .build();

        let message = Message::new(convo, alice.id, "ping");
        store.insert_message(message.clone()).await.unwrap();
        let outcome = hub
            .publish(&ChangeEvent::MessageCreated { message })
            .await
            .unwrap();

        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].handler, "always_fails");
        assert_eq!(store.notifications_for(bob.id).await.unwrap().len(), 1);
    }

    // =============================================================================
    // MESSAGE UPDATING → HISTORY
    // =============================================================================

    #[tokio::test]
    async fn test_edit_matrix_history_only_on_real_changes() {
        let w = world().await;
        let created = w
            .lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "draft"))
            .await
            .unwrap();

        // Same content: no row, no flag
        let same = w
            .lifecycle
            .update_message(created.id, "draft", w.alice.id)
            .await
            .unwrap();
        assert!(!same.edited);
        assert!(w.store.history_for(created.id).await.unwrap().is_empty());

        // Changed content: one row holding the overwritten body
        let changed = w
            .lifecycle
            .update_message(created.id, "final", w.alice.id)
            .await
            .unwrap();
        assert!(changed.edited);
        assert_eq!(changed.body, "final");
        let rows = w.store.history_for(created.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].old_body, "draft");

        // Second change stacks newest-first
        w.lifecycle
            .update_message(created.id, "final v2", w.bob.id)
            .await
            .unwrap();
        let bodies: Vec<_> = w
            .store
            .history_for(created.id)
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.old_body)
            .collect();
        assert_eq!(bodies, vec!["final", "draft"]);
    }

    #[tokio::test]
    async fn test_updating_a_missing_message_aborts_before_any_write() {
        let w = world().await;
        let ghost = MessageId::new();

        let error = w
            .lifecycle
            .update_message(ghost, "anything", w.alice.id)
            .await
            .unwrap_err();
        assert!(matches!(error, LifecycleError::HistoryCapture(_)));
        assert!(w.store.history_for(ghost).await.unwrap().is_empty());
    }

    // =============================================================================
    // USER DELETED → CLEANUP
    // =============================================================================

    #[tokio::test]
    async fn test_deleting_a_user_sweeps_exactly_their_footprint() {
        let w = world().await;

        // Alice posts a root, bob replies under it and posts his own
        let alice_root = w
            .lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "alice's root"))
            .await
            .unwrap();
        w.lifecycle
            .create_message(
                Message::new(w.convo, w.bob.id, "bob's reply").with_parent(alice_root.id),
            )
            .await
            .unwrap();
        let bob_own = w
            .lifecycle
            .create_message(Message::new(w.convo, w.bob.id, "bob's own"))
            .await
            .unwrap();
        // Bob edits his standalone message so a history row exists for it
        w.lifecycle
            .update_message(bob_own.id, "bob's own, revised", w.bob.id)
            .await
            .unwrap();

        w.lifecycle.delete_user(w.alice.id).await.unwrap();

        // Alice's row and her subtree are gone, bob's standalone is intact
        assert!(w.store.user(w.alice.id).await.is_err());
        let remaining = w.store.conversation_messages(w.convo).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, bob_own.id);

        // Alice's notifications (about bob's messages) are gone; bob's
        // notification about alice's root went with the cascade
        assert!(w.store.notifications_for(w.alice.id).await.unwrap().is_empty());
        assert!(w.store.notifications_for(w.bob.id).await.unwrap().is_empty());

        // History on the surviving message is untouched
        assert_eq!(w.store.history_for(bob_own.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_with_no_footprint_still_succeeds() {
        let w = world().await;
        w.lifecycle.delete_user(w.bob.id).await.unwrap();
        assert!(w.store.user(w.bob.id).await.is_err());
        assert!(w.store.user(w.alice.id).await.is_ok());
    }

    // =============================================================================
    // UNREAD QUERY AND MARK-READ
    // =============================================================================

    #[tokio::test]
    async fn test_unread_shrinks_as_messages_are_read() {
        let w = world().await;

        let first = w
            .lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "first"))
            .await
            .unwrap();
        let second = w
            .lifecycle
            .create_message(Message::new(w.convo, w.alice.id, "second"))
            .await
            .unwrap();

        // Bob sees both, newest first; alice sees none of her own
        let unread: Vec<_> = w
            .store
            .unread_for(w.bob.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(unread, vec![second.id, first.id]);
        assert!(w.store.unread_for(w.alice.id).await.unwrap().is_empty());

        w.store.mark_read(second.id, w.bob.id).await.unwrap();
        let unread: Vec<_> = w
            .store
            .unread_for(w.bob.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(unread, vec![first.id]);
    }
}
