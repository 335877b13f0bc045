//! Threaded view of a conversation's messages.
//!
//! Assembly is iterative. The message slice arrives in chronological order
//! and replies always postdate their parents, so a single reverse scan sees
//! every reply before its parent and can hand finished subtrees upward
//! without recursion, however deep the nesting gets.

use serde::{Deserialize, Serialize};
use shared_types::{Conversation, Message, MessageId};
use std::collections::HashMap;

/// One message plus its direct replies, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadNode {
    pub message: Message,
    pub replies: Vec<ThreadNode>,
}

/// A conversation with its messages arranged as reply trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadedConversation {
    pub conversation: Conversation,
    pub roots: Vec<ThreadNode>,
}

impl ThreadedConversation {
    /// Total number of messages across every tree, counted iteratively.
    #[must_use]
    pub fn total_messages(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&ThreadNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.replies.iter());
        }
        count
    }

    /// Locate a message anywhere in the trees.
    #[must_use]
    pub fn find(&self, id: MessageId) -> Option<&ThreadNode> {
        let mut stack: Vec<&ThreadNode> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            if node.message.id == id {
                return Some(node);
            }
            stack.extend(node.replies.iter());
        }
        None
    }
}

/// Arrange chronologically ordered messages into reply trees.
///
/// Roots come back in the slice's order; so do each node's replies. A reply
/// whose parent is absent from the slice is dropped rather than promoted.
#[must_use]
pub fn assemble(messages: &[Message]) -> Vec<ThreadNode> {
    let mut children: HashMap<MessageId, Vec<MessageId>> = HashMap::new();
    for message in messages {
        if let Some(parent) = message.parent_id {
            children.entry(parent).or_default().push(message.id);
        }
    }

    // Reverse scan: every reply is built before its parent asks for it
    let mut built: HashMap<MessageId, ThreadNode> = HashMap::new();
    for message in messages.iter().rev() {
        let replies = children
            .get(&message.id)
            .map(|ids| ids.iter().filter_map(|id| built.remove(id)).collect())
            .unwrap_or_default();
        built.insert(
            message.id,
            ThreadNode {
                message: message.clone(),
                replies,
            },
        );
    }

    messages
        .iter()
        .filter(|message| message.parent_id.is_none())
        .filter_map(|message| built.remove(&message.id))
        .collect()
}
