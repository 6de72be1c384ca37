//! Request DTOs for the messaging API
//!
//! Defines the structure of incoming HTTP request bodies and queries.

use serde::Deserialize;

use crate::models::ConversationKind;

/// Request body for creating a conversation (POST /api/conversations)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateConversationRequest {
    /// Conversation flavor
    pub kind: ConversationKind,
    /// Display name; required for group and channel conversations
    #[serde(default)]
    pub name: Option<String>,
    /// Initial participants besides the creator
    pub participants: Vec<String>,
}

impl CreateConversationRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.kind.requires_name() && self.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Some("Name is required for group and channel conversations".to_string());
        }
        if self.participants.iter().any(|p| p.is_empty()) {
            return Some("Participant ids cannot be empty".to_string());
        }
        None
    }
}

/// Request body for sending a message
/// (POST /api/conversations/:id/messages)
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub content: String,
    /// Optional display name; defaults to the caller's id
    #[serde(default)]
    pub sender: Option<String>,
}

impl SendMessageRequest {
    pub fn validate(&self) -> Option<String> {
        if self.content.trim().is_empty() {
            return Some("Message content is required".to_string());
        }
        None
    }
}

/// Request body for editing a message
/// (PATCH /api/conversations/:id/messages/:message_id)
#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageRequest {
    /// Replacement text
    pub content: String,
}

impl EditMessageRequest {
    pub fn validate(&self) -> Option<String> {
        if self.content.trim().is_empty() {
            return Some("Message content is required".to_string());
        }
        None
    }
}

/// Request body for adding a participant
/// (POST /api/conversations/:id/participants)
#[derive(Debug, Clone, Deserialize)]
pub struct AddParticipantRequest {
    /// The user to add
    pub user_id: String,
}

impl AddParticipantRequest {
    pub fn validate(&self) -> Option<String> {
        if self.user_id.is_empty() {
            return Some("User ID is required".to_string());
        }
        None
    }
}

/// Pagination query for the message list endpoint
/// (GET /api/conversations/:id/messages?limit=&offset=)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl MessagesQuery {
    /// Page size, defaulting to 50.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(50)
    }

    /// Page start, defaulting to 0.
    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_conversation_deserialize() {
        let json = r#"{"kind": "group", "name": "Team", "participants": ["u2", "u3"]}"#;
        let req: CreateConversationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.kind, ConversationKind::Group);
        assert_eq!(req.name.as_deref(), Some("Team"));
        assert_eq!(req.participants.len(), 2);
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_group_without_name_is_invalid() {
        let req = CreateConversationRequest {
            kind: ConversationKind::Group,
            name: None,
            participants: vec!["u2".to_string()],
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_direct_without_name_is_valid() {
        let req = CreateConversationRequest {
            kind: ConversationKind::Direct,
            name: None,
            participants: vec!["u2".to_string()],
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_send_message_blank_content_is_invalid() {
        let req = SendMessageRequest {
            content: "   ".to_string(),
            sender: None,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_send_message_deserialize_without_sender() {
        let json = r#"{"content": "hello"}"#;
        let req: SendMessageRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.content, "hello");
        assert!(req.sender.is_none());
    }

    #[test]
    fn test_messages_query_defaults() {
        let query = MessagesQuery::default();
        assert_eq!(query.limit(), 50);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn test_messages_query_explicit_window() {
        let query = MessagesQuery {
            limit: Some(20),
            offset: Some(40),
        };
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 40);
    }

    #[test]
    fn test_add_participant_empty_user_is_invalid() {
        let req = AddParticipantRequest {
            user_id: String::new(),
        };
        assert!(req.validate().is_some());
    }
}
