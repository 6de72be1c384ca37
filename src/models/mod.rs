//! Domain and API models for the messaging server
//!
//! This module defines the domain types shared by the store and cache,
//! plus the DTOs (Data Transfer Objects) used for serializing and
//! deserializing HTTP request and response bodies.

pub mod domain;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use domain::{
    Conversation, ConversationKind, ConversationSummary, Message, MessagePage, MessagePreview,
    Pagination, Participant,
};
pub use requests::{
    AddParticipantRequest, CreateConversationRequest, EditMessageRequest, MessagesQuery,
    SendMessageRequest,
};
pub use responses::{
    AckResponse, ConversationCreatedResponse, ErrorResponse, HealthResponse, MessageResponse,
};
