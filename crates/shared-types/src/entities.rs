//! # Core Domain Entities
//!
//! Defines the messaging entities shared by the gateway, store, and signal
//! crates.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, [`Role`], [`User`]
//! - **Conversations**: `ConversationId`, [`Conversation`]
//! - **Messages**: `MessageId`, [`Message`]
//! - **Reactions**: `NotificationId`, [`Notification`], `HistoryId`,
//!   [`MessageHistory`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Unique identifier for a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A user's role, drawn from a fixed enumeration.
///
/// Every [`User`] carries exactly one role; there is no "missing role" state.
/// An unauthenticated request is modeled as the absence of a `User`, not as a
/// user with an absent role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unprivileged visitor account.
    Guest,
    /// Regular registered member.
    Member,
    /// Moderation staff; passes the role gate.
    Moderator,
    /// Full administrator; passes the role gate.
    Admin,
}

impl Role {
    /// Lowercase wire/display name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }

    /// Whether this role clears the protected-path gate.
    ///
    /// Only admins and moderators may touch protected prefixes.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "member" => Ok(Self::Member),
            "moderator" => Ok(Self::Moderator),
            "admin" => Ok(Self::Admin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// An authenticated principal.
///
/// This is the identity the gateway's role gate and the audit log consume,
/// and the owner of messages and notifications on the reaction side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique account id.
    pub id: UserId,
    /// Login / display name; appears in audit lines and notifications.
    pub username: String,
    /// Contact address.
    pub email: String,
    /// The account's role.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a user with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(username: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            role,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// CLUSTER B: CONVERSATIONS
// =============================================================================

/// Unique identifier for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A conversation between two or more participants.
///
/// Messages always belong to exactly one conversation; notification fan-out
/// is resolved from the participant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation id.
    pub id: ConversationId,
    /// Optional human-readable title (may be empty).
    pub title: String,
    /// Accounts taking part in this conversation.
    pub participant_ids: Vec<UserId>,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Last structural change (participant or title edits).
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation with a fresh id and the current timestamps.
    #[must_use]
    pub fn new(title: impl Into<String>, participant_ids: Vec<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            title: title.into(),
            participant_ids,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user takes part in this conversation.
    #[must_use]
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participant_ids.contains(&user_id)
    }
}

// =============================================================================
// CLUSTER C: MESSAGES
// =============================================================================

/// Unique identifier for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A message inside a conversation, optionally replying to a parent message.
///
/// Parent references form the reply threads: following `parent_id` upward
/// always terminates at a unique thread root. The store enforces at insert
/// time that a parent exists and belongs to the same conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message id.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// The account that sent the message.
    pub sender_id: UserId,
    /// Message text.
    pub body: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// Parent message when this is a threaded reply.
    pub parent_id: Option<MessageId>,
    /// Set once the body has been changed after creation.
    pub edited: bool,
    /// Accounts that have read this message.
    pub read_by: HashSet<UserId>,
}

impl Message {
    /// Create a root (non-reply) message with a fresh id.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            sender_id,
            body: body.into(),
            created_at: Utc::now(),
            parent_id: None,
            edited: false,
            read_by: HashSet::new(),
        }
    }

    /// Turn this message into a reply to `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: MessageId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Whether `user_id` has read this message.
    #[must_use]
    pub fn is_read_by(&self, user_id: UserId) -> bool {
        self.read_by.contains(&user_id)
    }
}

// =============================================================================
// CLUSTER D: REACTIONS (notifications, edit history)
// =============================================================================

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A per-recipient notification produced when a message is created.
///
/// Exactly one notification exists per (message, recipient) pair; the
/// notification handler guards against double-firing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification id.
    pub id: NotificationId,
    /// The recipient who owns this notification.
    pub user_id: UserId,
    /// The message that triggered it.
    pub message_id: MessageId,
    /// Rendered notification text.
    pub content: String,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the recipient has seen it.
    pub read: bool,
}

impl Notification {
    /// Create an unread notification with a fresh id.
    #[must_use]
    pub fn new(user_id: UserId, message_id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            message_id,
            content: content.into(),
            created_at: Utc::now(),
            read: false,
        }
    }
}

/// Unique identifier for a message-history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HistoryId(pub Uuid);

impl HistoryId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HistoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HistoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An immutable snapshot of a message body taken just before an edit.
///
/// Rows are append-only; they are removed only when their owning message is
/// deleted (cascade).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHistory {
    /// Unique history-row id.
    pub id: HistoryId,
    /// The message this snapshot belongs to.
    pub message_id: MessageId,
    /// The body as it was before the edit overwrote it.
    pub old_body: String,
    /// The account that performed the edit.
    pub edited_by: UserId,
    /// When the edit happened.
    pub edited_at: DateTime<Utc>,
}

impl MessageHistory {
    /// Create a history row with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(message_id: MessageId, old_body: impl Into<String>, edited_by: UserId) -> Self {
        Self {
            id: HistoryId::new(),
            message_id,
            old_body: old_body.into(),
            edited_by,
            edited_at: Utc::now(),
        }
    }
}
