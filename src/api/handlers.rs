//! API Handlers
//!
//! HTTP request handlers for the messaging endpoints. Reads go through the
//! conversation cache; writes hit the store, invalidate the cache, then
//! broadcast an event, in that order, before the response leaves.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use tracing::debug;

use crate::cache::{CacheStats, ConversationCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::events::{ConversationEvent, EventBroadcaster};
use crate::models::{
    AckResponse, AddParticipantRequest, ConversationCreatedResponse, ConversationSummary,
    CreateConversationRequest, EditMessageRequest, HealthResponse, MessagePage, MessageResponse,
    MessagesQuery, SendMessageRequest,
};
use crate::store::MessagingStore;

// == App State ==
/// Application state shared across all handlers.
///
/// One cache and one store per process; both behind their own lock so the
/// cache can be taken without holding up the store and vice versa.
#[derive(Clone)]
pub struct AppState {
    /// Read-through conversation cache
    pub cache: Arc<RwLock<ConversationCache>>,
    /// Source of truth for all messaging tables
    pub store: Arc<RwLock<MessagingStore>>,
    /// Message event fan-out
    pub events: EventBroadcaster,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: ConversationCache, store: MessagingStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            store: Arc::new(RwLock::new(store)),
            events: EventBroadcaster::new(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let cache = ConversationCache::new(config.max_entries, config.cache_ttl_ms());
        Self::new(cache, MessagingStore::new())
    }
}

// == Caller Identity ==
/// The calling user, taken from the `x-user-id` header.
///
/// Stands in for the session middleware that fronts this service; requests
/// without an identity are rejected before any handler runs.
pub struct UserId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .filter(|id| !id.is_empty())
            .map(|id| UserId(id.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
    }
}

// == Conversation Handlers ==

/// Handler for GET /api/conversations
///
/// Returns the caller's conversation list, from cache when fresh.
pub async fn list_conversations(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<Vec<ConversationSummary>>> {
    {
        // Write lock: a cache read touches LRU order and counters.
        let mut cache = state.cache.write().await;
        if let Some(conversations) = cache.get_user_conversations(&user_id) {
            debug!(%user_id, "conversation list served from cache");
            return Ok(Json(conversations));
        }
    }

    let conversations = {
        let store = state.store.read().await;
        store.list_user_conversations(&user_id)
    };

    let mut cache = state.cache.write().await;
    cache.set_user_conversations(&user_id, conversations.clone());
    Ok(Json(conversations))
}

/// Handler for POST /api/conversations
///
/// Creates a conversation and drops the (now incomplete) cached lists of
/// everyone who just became a participant.
pub async fn create_conversation(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(req): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<ConversationCreatedResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let summary = {
        let mut store = state.store.write().await;
        store.create_conversation(&user_id, req.kind, req.name, &req.participants)?
    };

    {
        let mut cache = state.cache.write().await;
        for participant in &summary.participants {
            cache.invalidate_user_conversations(&participant.user_id);
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(ConversationCreatedResponse::new(summary)),
    ))
}

// == Message Handlers ==

/// Handler for GET /api/conversations/:id/messages
///
/// Returns one page of the conversation's messages, from cache when the
/// exact (limit, offset) window is fresh. Participants only.
pub async fn get_messages(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<i64>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagePage>> {
    {
        let store = state.store.read().await;
        if !store.is_participant(conversation_id, &user_id) {
            return Err(ApiError::AccessDenied(
                "Access denied to this conversation".to_string(),
            ));
        }
    }

    let (limit, offset) = (query.limit(), query.offset());

    {
        let mut cache = state.cache.write().await;
        if let Some(page) = cache.get_conversation_messages(conversation_id, limit, offset) {
            debug!(conversation_id, limit, offset, "message page served from cache");
            return Ok(Json(page));
        }
    }

    let page = {
        let store = state.store.read().await;
        store.conversation_messages(conversation_id, limit, offset)?
    };

    let mut cache = state.cache.write().await;
    cache.set_conversation_messages(
        conversation_id,
        limit,
        offset,
        page.messages.clone(),
        page.pagination.clone(),
    );
    Ok(Json(page))
}

/// Handler for POST /api/conversations/:id/messages
///
/// Appends a message, invalidates every affected cache entry, then
/// broadcasts the event. Participants only.
pub async fn send_message(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let (message, affected) = {
        let mut store = state.store.write().await;
        if !store.is_participant(conversation_id, &user_id) {
            return Err(ApiError::AccessDenied(
                "Access denied to this conversation".to_string(),
            ));
        }
        let message = store.send_message(conversation_id, &user_id, &req.content, req.sender)?;
        (message, store.participant_user_ids(conversation_id))
    };

    {
        let mut cache = state.cache.write().await;
        cache.invalidate_on_new_message(conversation_id, &affected);
    }

    state.events.publish(ConversationEvent::NewMessage {
        conversation_id,
        message: message.clone(),
    });

    Ok((StatusCode::CREATED, Json(MessageResponse::sent(message))))
}

/// Handler for PATCH /api/conversations/:id/messages/:message_id
///
/// Edits a message. The store only matches messages the caller authored.
pub async fn edit_message(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
    Json(req): Json<EditMessageRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let (message, affected) = {
        let mut store = state.store.write().await;
        let message = store.edit_message(conversation_id, message_id, &user_id, &req.content)?;
        (message, store.participant_user_ids(conversation_id))
    };

    {
        let mut cache = state.cache.write().await;
        cache.invalidate_on_new_message(conversation_id, &affected);
    }

    state.events.publish(ConversationEvent::MessageUpdated {
        conversation_id,
        message: message.clone(),
    });

    Ok(Json(MessageResponse::updated(message)))
}

/// Handler for DELETE /api/conversations/:id/messages/:message_id
///
/// Deletes a message the caller authored.
pub async fn delete_message(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path((conversation_id, message_id)): Path<(i64, i64)>,
) -> Result<Json<AckResponse>> {
    let affected = {
        let mut store = state.store.write().await;
        store.delete_message(conversation_id, message_id, &user_id)?;
        store.participant_user_ids(conversation_id)
    };

    {
        let mut cache = state.cache.write().await;
        cache.invalidate_on_new_message(conversation_id, &affected);
    }

    state.events.publish(ConversationEvent::MessageDeleted {
        conversation_id,
        message_id,
    });

    Ok(Json(AckResponse::new("Message deleted successfully")))
}

/// Handler for POST /api/conversations/:id/read
///
/// Marks the conversation read for the caller. Only the caller's own
/// conversation list depends on read state, so only that entry is dropped.
pub async fn mark_read(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<i64>,
) -> Result<Json<AckResponse>> {
    {
        let mut store = state.store.write().await;
        store.mark_read(conversation_id, &user_id)?;
    }

    let mut cache = state.cache.write().await;
    cache.invalidate_user_conversations(&user_id);

    Ok(Json(AckResponse::new("Conversation marked as read")))
}

// == Participant Handlers ==

/// Handler for POST /api/conversations/:id/participants
///
/// Adds a user to the conversation. Participants only; duplicates rejected.
pub async fn add_participant(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path(conversation_id): Path<i64>,
    Json(req): Json<AddParticipantRequest>,
) -> Result<(StatusCode, Json<AckResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let affected = {
        let mut store = state.store.write().await;
        if !store.is_participant(conversation_id, &user_id) {
            return Err(ApiError::AccessDenied(
                "Access denied to this conversation".to_string(),
            ));
        }
        store.add_participant(conversation_id, &req.user_id)?;
        store.participant_user_ids(conversation_id)
    };

    let mut cache = state.cache.write().await;
    cache.invalidate_on_new_message(conversation_id, &affected);

    Ok((
        StatusCode::CREATED,
        Json(AckResponse::new("Participant added successfully")),
    ))
}

/// Handler for DELETE /api/conversations/:id/participants/:user_id
///
/// Removes a participant. Callers may only remove themselves.
pub async fn remove_participant(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Path((conversation_id, target_user_id)): Path<(i64, String)>,
) -> Result<Json<AckResponse>> {
    if user_id != target_user_id {
        return Err(ApiError::AccessDenied("Permission denied".to_string()));
    }

    let affected = {
        let mut store = state.store.write().await;
        // Snapshot membership before the removal so the leaver's own list
        // entry gets dropped too.
        let affected = store.participant_user_ids(conversation_id);
        store.remove_participant(conversation_id, &target_user_id)?;
        affected
    };

    let mut cache = state.cache.write().await;
    cache.invalidate_on_new_message(conversation_id, &affected);

    Ok(Json(AckResponse::new("Participant removed successfully")))
}

// == Introspection Handlers ==

/// Handler for GET /api/cache/stats
///
/// Returns current occupancy and counters for both cache namespaces.
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
