//! Domain types for conversations, participants and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Conversation Kind ==
/// Conversation flavor: one-to-one, ad-hoc group or named channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Direct,
    Group,
    Channel,
}

impl ConversationKind {
    /// Direct conversations carry no display name; the other kinds need one.
    pub fn requires_name(&self) -> bool {
        !matches!(self, ConversationKind::Direct)
    }
}

// == Conversation ==
/// A conversation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub kind: ConversationKind,
    /// Display name; always None for direct conversations
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// == Participant ==
/// Membership of one user in one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub joined_at: DateTime<Utc>,
    /// Last time the user marked the conversation as read
    pub last_read_at: Option<DateTime<Utc>>,
}

// == Message ==
/// A message row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub user_id: String,
    pub content: String,
    /// Display name shown next to the message
    pub sender: String,
    pub created_at: DateTime<Utc>,
    /// Set once the message has been edited
    pub updated_at: Option<DateTime<Utc>>,
}

// == Message Preview ==
/// Trimmed-down last message shown in conversation lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub content: String,
    pub sender: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessagePreview {
    fn from(message: &Message) -> Self {
        Self {
            content: message.content.clone(),
            sender: message.sender.clone(),
            created_at: message.created_at,
        }
    }
}

// == Conversation Summary ==
/// One row of a user's conversation list: the conversation enriched with
/// its participants, latest message and that user's unread count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    pub kind: ConversationKind,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
    pub last_message: Option<MessagePreview>,
    pub unread_count: usize,
}

// == Pagination ==
/// Window descriptor for a page of messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
    pub total: usize,
    pub has_more: bool,
}

// == Message Page ==
/// One page of a conversation's messages plus its pagination window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub pagination: Pagination,
}
