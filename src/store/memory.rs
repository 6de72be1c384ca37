//! In-Memory Messaging Store
//!
//! The source of truth for conversations, participants and messages.
//! Every cache miss lands here; the cache is only ever a projection of
//! what this store holds.

use std::collections::HashMap;

use chrono::Utc;

use crate::error::{ApiError, Result};
use crate::models::{
    Conversation, ConversationKind, ConversationSummary, Message, MessagePage, MessagePreview,
    Pagination, Participant,
};

// == Messaging Store ==
/// HashMap-backed store for the messaging tables.
///
/// Messages are kept per conversation in creation order, which is also the
/// order pages are served in.
#[derive(Debug, Default)]
pub struct MessagingStore {
    /// Conversation rows by id
    conversations: HashMap<i64, Conversation>,
    /// Participants per conversation
    participants: HashMap<i64, Vec<Participant>>,
    /// Messages per conversation, ordered by creation
    messages: HashMap<i64, Vec<Message>>,
    next_conversation_id: i64,
    next_message_id: i64,
}

impl MessagingStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Create Conversation ==
    /// Creates a conversation with the creator plus the given participants.
    ///
    /// Participants are deduplicated; the creator is always first. Direct
    /// conversations never carry a name.
    pub fn create_conversation(
        &mut self,
        creator_id: &str,
        kind: ConversationKind,
        name: Option<String>,
        participant_ids: &[String],
    ) -> Result<ConversationSummary> {
        if kind.requires_name() && name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(ApiError::InvalidRequest(
                "Name is required for group and channel conversations".to_string(),
            ));
        }

        self.next_conversation_id += 1;
        let id = self.next_conversation_id;
        let now = Utc::now();

        let conversation = Conversation {
            id,
            kind,
            name: if kind == ConversationKind::Direct {
                None
            } else {
                name
            },
            created_at: now,
        };

        let mut member_ids: Vec<&str> = vec![creator_id];
        for participant_id in participant_ids {
            if !member_ids.contains(&participant_id.as_str()) {
                member_ids.push(participant_id);
            }
        }
        let members: Vec<Participant> = member_ids
            .into_iter()
            .map(|user_id| Participant {
                user_id: user_id.to_string(),
                joined_at: now,
                last_read_at: None,
            })
            .collect();

        self.conversations.insert(id, conversation.clone());
        self.participants.insert(id, members.clone());
        self.messages.insert(id, Vec::new());

        Ok(ConversationSummary {
            id,
            kind,
            name: conversation.name,
            created_at: now,
            participants: members,
            last_message: None,
            unread_count: 0,
        })
    }

    // == List User Conversations ==
    /// Returns summaries of every conversation the user participates in,
    /// newest conversation first.
    pub fn list_user_conversations(&self, user_id: &str) -> Vec<ConversationSummary> {
        let mut summaries: Vec<ConversationSummary> = self
            .conversations
            .values()
            .filter(|conversation| self.is_participant(conversation.id, user_id))
            .map(|conversation| self.summarize(conversation, user_id))
            .collect();

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        summaries
    }

    fn summarize(&self, conversation: &Conversation, user_id: &str) -> ConversationSummary {
        let participants = self
            .participants
            .get(&conversation.id)
            .cloned()
            .unwrap_or_default();
        let messages = self
            .messages
            .get(&conversation.id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let last_read_at = participants
            .iter()
            .find(|p| p.user_id == user_id)
            .and_then(|p| p.last_read_at);
        let unread_count = messages
            .iter()
            .filter(|m| m.user_id != user_id)
            .filter(|m| last_read_at.map_or(true, |read_at| m.created_at > read_at))
            .count();

        ConversationSummary {
            id: conversation.id,
            kind: conversation.kind,
            name: conversation.name.clone(),
            created_at: conversation.created_at,
            participants,
            last_message: messages.last().map(MessagePreview::from),
            unread_count,
        }
    }

    // == Membership ==
    /// Whether the user participates in the conversation.
    pub fn is_participant(&self, conversation_id: i64, user_id: &str) -> bool {
        self.participants
            .get(&conversation_id)
            .map(|members| members.iter().any(|p| p.user_id == user_id))
            .unwrap_or(false)
    }

    /// User ids of every participant in the conversation.
    pub fn participant_user_ids(&self, conversation_id: i64) -> Vec<String> {
        self.participants
            .get(&conversation_id)
            .map(|members| members.iter().map(|p| p.user_id.clone()).collect())
            .unwrap_or_default()
    }

    // == Message Pages ==
    /// Returns one page of the conversation's messages in creation order.
    pub fn conversation_messages(
        &self,
        conversation_id: i64,
        limit: usize,
        offset: usize,
    ) -> Result<MessagePage> {
        let messages = self
            .messages
            .get(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        let total = messages.len();
        let page: Vec<Message> = messages.iter().skip(offset).take(limit).cloned().collect();

        Ok(MessagePage {
            messages: page,
            pagination: Pagination {
                limit,
                offset,
                total,
                has_more: offset.saturating_add(limit) < total,
            },
        })
    }

    // == Send Message ==
    /// Appends a message to the conversation.
    ///
    /// Content is trimmed; the sender display name falls back to the
    /// author's id.
    pub fn send_message(
        &mut self,
        conversation_id: i64,
        user_id: &str,
        content: &str,
        sender: Option<String>,
    ) -> Result<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::InvalidRequest(
                "Message content is required".to_string(),
            ));
        }

        let messages = self
            .messages
            .get_mut(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        self.next_message_id += 1;
        let message = Message {
            id: self.next_message_id,
            conversation_id,
            user_id: user_id.to_string(),
            content: content.to_string(),
            sender: sender.unwrap_or_else(|| user_id.to_string()),
            created_at: Utc::now(),
            updated_at: None,
        };

        messages.push(message.clone());
        Ok(message)
    }

    // == Edit Message ==
    /// Replaces a message's content. Only the author may edit; a foreign
    /// message reads the same as a missing one.
    pub fn edit_message(
        &mut self,
        conversation_id: i64,
        message_id: i64,
        user_id: &str,
        content: &str,
    ) -> Result<Message> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::InvalidRequest(
                "Message content is required".to_string(),
            ));
        }

        let messages = self
            .messages
            .get_mut(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        let message = messages
            .iter_mut()
            .find(|m| m.id == message_id && m.user_id == user_id)
            .ok_or_else(|| {
                ApiError::NotFound("Message not found or access denied".to_string())
            })?;

        message.content = content.to_string();
        message.updated_at = Some(Utc::now());
        Ok(message.clone())
    }

    // == Delete Message ==
    /// Removes a message. Only the author may delete.
    pub fn delete_message(
        &mut self,
        conversation_id: i64,
        message_id: i64,
        user_id: &str,
    ) -> Result<()> {
        let messages = self
            .messages
            .get_mut(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        let index = messages
            .iter()
            .position(|m| m.id == message_id && m.user_id == user_id)
            .ok_or_else(|| {
                ApiError::NotFound("Message not found or access denied".to_string())
            })?;

        messages.remove(index);
        Ok(())
    }

    // == Mark Read ==
    /// Updates the user's last-read timestamp for the conversation.
    pub fn mark_read(&mut self, conversation_id: i64, user_id: &str) -> Result<()> {
        let members = self
            .participants
            .get_mut(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        let participant = members
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| {
                ApiError::AccessDenied("Access denied to this conversation".to_string())
            })?;

        participant.last_read_at = Some(Utc::now());
        Ok(())
    }

    // == Add Participant ==
    /// Adds a user to the conversation. Duplicates are rejected.
    pub fn add_participant(&mut self, conversation_id: i64, user_id: &str) -> Result<Participant> {
        let members = self
            .participants
            .get_mut(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        if members.iter().any(|p| p.user_id == user_id) {
            return Err(ApiError::InvalidRequest(
                "User is already a participant".to_string(),
            ));
        }

        let participant = Participant {
            user_id: user_id.to_string(),
            joined_at: Utc::now(),
            last_read_at: None,
        };
        members.push(participant.clone());
        Ok(participant)
    }

    // == Remove Participant ==
    /// Removes a user from the conversation. Removing an absent user is a
    /// no-op, matching the idempotent delete semantics of the API.
    pub fn remove_participant(&mut self, conversation_id: i64, user_id: &str) -> Result<()> {
        let members = self
            .participants
            .get_mut(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))?;

        members.retain(|p| p.user_id != user_id);
        Ok(())
    }

    // == Lookups ==
    /// Returns the conversation row.
    pub fn conversation(&self, conversation_id: i64) -> Result<&Conversation> {
        self.conversations
            .get(&conversation_id)
            .ok_or_else(|| ApiError::NotFound(format!("Conversation {conversation_id}")))
    }

    /// Number of conversations held.
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_direct() -> (MessagingStore, i64) {
        let mut store = MessagingStore::new();
        let summary = store
            .create_conversation("u1", ConversationKind::Direct, None, &["u2".to_string()])
            .unwrap();
        (store, summary.id)
    }

    #[test]
    fn test_create_conversation_dedupes_participants() {
        let mut store = MessagingStore::new();
        let summary = store
            .create_conversation(
                "u1",
                ConversationKind::Group,
                Some("Team".to_string()),
                &["u2".to_string(), "u1".to_string(), "u2".to_string()],
            )
            .unwrap();

        let ids: Vec<&str> = summary
            .participants
            .iter()
            .map(|p| p.user_id.as_str())
            .collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[test]
    fn test_create_group_without_name_fails() {
        let mut store = MessagingStore::new();
        let result =
            store.create_conversation("u1", ConversationKind::Group, None, &["u2".to_string()]);
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_direct_conversation_drops_name() {
        let mut store = MessagingStore::new();
        let summary = store
            .create_conversation(
                "u1",
                ConversationKind::Direct,
                Some("ignored".to_string()),
                &["u2".to_string()],
            )
            .unwrap();
        assert!(summary.name.is_none());
    }

    #[test]
    fn test_list_user_conversations_filters_by_membership() {
        let (mut store, _) = store_with_direct();
        store
            .create_conversation(
                "u3",
                ConversationKind::Group,
                Some("Other".to_string()),
                &["u4".to_string()],
            )
            .unwrap();

        assert_eq!(store.list_user_conversations("u1").len(), 1);
        assert_eq!(store.list_user_conversations("u3").len(), 1);
        assert_eq!(store.list_user_conversations("u5").len(), 0);
    }

    #[test]
    fn test_send_and_page_messages() {
        let (mut store, id) = store_with_direct();

        for i in 0..5 {
            store
                .send_message(id, "u1", &format!("message {i}"), None)
                .unwrap();
        }

        let page = store.conversation_messages(id, 2, 2).unwrap();
        assert_eq!(page.messages.len(), 2);
        assert_eq!(page.messages[0].content, "message 2");
        assert_eq!(page.pagination.total, 5);
        assert!(page.pagination.has_more);

        let last_page = store.conversation_messages(id, 2, 4).unwrap();
        assert_eq!(last_page.messages.len(), 1);
        assert!(!last_page.pagination.has_more);
    }

    #[test]
    fn test_messages_for_unknown_conversation() {
        let store = MessagingStore::new();
        assert!(matches!(
            store.conversation_messages(99, 50, 0),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_send_message_trims_content() {
        let (mut store, id) = store_with_direct();
        let message = store.send_message(id, "u1", "  hello  ", None).unwrap();
        assert_eq!(message.content, "hello");
        assert_eq!(message.sender, "u1");
    }

    #[test]
    fn test_send_blank_message_fails() {
        let (mut store, id) = store_with_direct();
        assert!(matches!(
            store.send_message(id, "u1", "   ", None),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_edit_message_author_only() {
        let (mut store, id) = store_with_direct();
        let message = store.send_message(id, "u1", "original", None).unwrap();

        let edited = store.edit_message(id, message.id, "u1", "edited").unwrap();
        assert_eq!(edited.content, "edited");
        assert!(edited.updated_at.is_some());

        // A non-author sees the same response as a missing message.
        assert!(matches!(
            store.edit_message(id, message.id, "u2", "hijack"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_message_author_only() {
        let (mut store, id) = store_with_direct();
        let message = store.send_message(id, "u1", "to delete", None).unwrap();

        assert!(matches!(
            store.delete_message(id, message.id, "u2"),
            Err(ApiError::NotFound(_))
        ));

        store.delete_message(id, message.id, "u1").unwrap();
        let page = store.conversation_messages(id, 50, 0).unwrap();
        assert!(page.messages.is_empty());
    }

    #[test]
    fn test_unread_count_follows_mark_read() {
        let (mut store, id) = store_with_direct();

        store.send_message(id, "u1", "one", None).unwrap();
        store.send_message(id, "u1", "two", None).unwrap();

        // u2 has never read the conversation; u1 authored everything.
        let for_u2 = store.list_user_conversations("u2");
        assert_eq!(for_u2[0].unread_count, 2);
        let for_u1 = store.list_user_conversations("u1");
        assert_eq!(for_u1[0].unread_count, 0);

        store.mark_read(id, "u2").unwrap();
        let for_u2 = store.list_user_conversations("u2");
        assert_eq!(for_u2[0].unread_count, 0);

        store.send_message(id, "u1", "three", None).unwrap();
        let for_u2 = store.list_user_conversations("u2");
        assert_eq!(for_u2[0].unread_count, 1);
    }

    #[test]
    fn test_mark_read_requires_membership() {
        let (mut store, id) = store_with_direct();
        assert!(matches!(
            store.mark_read(id, "outsider"),
            Err(ApiError::AccessDenied(_))
        ));
    }

    #[test]
    fn test_add_participant_rejects_duplicates() {
        let (mut store, id) = store_with_direct();

        store.add_participant(id, "u3").unwrap();
        assert!(store.is_participant(id, "u3"));

        assert!(matches!(
            store.add_participant(id, "u3"),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_remove_participant_is_idempotent() {
        let (mut store, id) = store_with_direct();

        store.remove_participant(id, "u2").unwrap();
        assert!(!store.is_participant(id, "u2"));

        // Removing again is a no-op.
        store.remove_participant(id, "u2").unwrap();
    }

    #[test]
    fn test_participant_user_ids() {
        let (store, id) = store_with_direct();
        let mut ids = store.participant_user_ids(id);
        ids.sort();
        assert_eq!(ids, vec!["u1".to_string(), "u2".to_string()]);
    }

    #[test]
    fn test_last_message_preview_in_summary() {
        let (mut store, id) = store_with_direct();

        store.send_message(id, "u1", "first", None).unwrap();
        store
            .send_message(id, "u2", "latest", Some("Bob".to_string()))
            .unwrap();

        let summaries = store.list_user_conversations("u1");
        let preview = summaries[0].last_message.as_ref().unwrap();
        assert_eq!(preview.content, "latest");
        assert_eq!(preview.sender, "Bob");
    }
}
