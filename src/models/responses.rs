//! Response DTOs for the messaging API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::models::{ConversationSummary, Message};

/// Response body for conversation creation (POST /api/conversations)
#[derive(Debug, Clone, Serialize)]
pub struct ConversationCreatedResponse {
    /// Success message
    pub message: String,
    /// The conversation, enriched with its initial participants
    pub conversation: ConversationSummary,
}

impl ConversationCreatedResponse {
    /// Creates a new ConversationCreatedResponse
    pub fn new(conversation: ConversationSummary) -> Self {
        Self {
            message: "Conversation created successfully".to_string(),
            conversation,
        }
    }
}

/// Response body for message writes (POST and PATCH message endpoints)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Success message
    pub message: String,
    /// The created or updated message row
    pub data: Message,
}

impl MessageResponse {
    pub fn sent(data: Message) -> Self {
        Self {
            message: "Message sent successfully".to_string(),
            data,
        }
    }

    pub fn updated(data: Message) -> Self {
        Self {
            message: "Message updated successfully".to_string(),
            data,
        }
    }
}

/// Plain acknowledgement body for deletes, reads and participant changes
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    /// Success message
    pub message: String,
}

impl AckResponse {
    /// Creates a new AckResponse
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
