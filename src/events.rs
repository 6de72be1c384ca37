//! Message Event Broadcast
//!
//! Publishes message write events on an in-process broadcast channel.
//! Transport (WebSocket fan-out) attaches via `subscribe`; the write path
//! only cares that the event is published after cache invalidation.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::Message;

/// Buffered events per subscriber before lagging ones start losing them.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// == Conversation Event ==
/// A message write, in the shape consumers need to react to it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConversationEvent {
    NewMessage {
        conversation_id: i64,
        message: Message,
    },
    MessageUpdated {
        conversation_id: i64,
        message: Message,
    },
    MessageDeleted {
        conversation_id: i64,
        message_id: i64,
    },
}

impl ConversationEvent {
    /// The conversation the event belongs to.
    pub fn conversation_id(&self) -> i64 {
        match self {
            ConversationEvent::NewMessage {
                conversation_id, ..
            }
            | ConversationEvent::MessageUpdated {
                conversation_id, ..
            }
            | ConversationEvent::MessageDeleted {
                conversation_id, ..
            } => *conversation_id,
        }
    }
}

// == Event Broadcaster ==
/// Cloneable handle publishing events to every current subscriber.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<ConversationEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster with the default per-subscriber buffer.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publishes an event to all current subscribers.
    ///
    /// With no subscribers attached the event is simply dropped.
    pub fn publish(&self, event: ConversationEvent) {
        let conversation_id = event.conversation_id();
        match self.tx.send(event) {
            Ok(receivers) => {
                debug!(conversation_id, receivers, "broadcast conversation event");
            }
            Err(_) => {
                debug!(conversation_id, "no subscribers for conversation event");
            }
        }
    }

    /// Attaches a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
