//! Conversation Cache Module
//!
//! Read-through cache over two independent namespaces: conversation lists
//! keyed by user, and message pages keyed by conversation plus pagination
//! window. Writes to either table go through the explicit invalidation
//! hooks; TTL expiry is the backstop for any call site that forgets.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, TtlLruMap};
use crate::models::{ConversationSummary, Message, MessagePage, Pagination};

// == Key Composition ==

fn user_key(user_id: &str) -> String {
    format!("user:{user_id}")
}

fn page_key(conversation_id: i64, limit: usize, offset: usize) -> String {
    format!("conv:{conversation_id}:{limit}:{offset}")
}

fn conversation_prefix(conversation_id: i64) -> String {
    // Trailing colon keeps conv 4 from matching conv 42.
    format!("conv:{conversation_id}:")
}

// == Conversation Cache ==
/// Bounded, time-expiring read-through cache for conversation data.
///
/// Never a source of truth: every operation is allowed to miss, and callers
/// must fall back to the backing store. The two namespaces are physically
/// independent maps; nothing couples them transactionally.
#[derive(Debug)]
pub struct ConversationCache {
    /// Conversation lists, one entry per user
    conversations: TtlLruMap<String, CacheEntry<Vec<ConversationSummary>>>,
    /// Message pages, one entry per (conversation, limit, offset) window
    messages: TtlLruMap<String, CacheEntry<MessagePage>>,
    /// Maximum entry age in milliseconds
    ttl_ms: u64,
    /// Time source shared with both namespaces
    clock: Arc<dyn Clock>,
}

impl ConversationCache {
    // == Constructor ==
    /// Creates a cache with the given per-namespace capacity and TTL.
    pub fn new(max_entries: usize, ttl_ms: u64) -> Self {
        Self::with_clock(max_entries, ttl_ms, Arc::new(SystemClock))
    }

    /// Creates a cache driven by an explicit time source.
    pub fn with_clock(max_entries: usize, ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            conversations: TtlLruMap::new(max_entries, ttl_ms, clock.clone()),
            messages: TtlLruMap::new(max_entries, ttl_ms, clock.clone()),
            ttl_ms,
            clock,
        }
    }

    // == User Conversation Lists ==

    /// Returns the cached conversation list for a user, if present and fresh.
    ///
    /// A missing or malformed user id is just a miss, never an error.
    pub fn get_user_conversations(&mut self, user_id: &str) -> Option<Vec<ConversationSummary>> {
        if user_id.is_empty() {
            return None;
        }

        let entry = self.conversations.get(&user_key(user_id))?;
        // The map already dropped entries past their TTL; re-check the entry's
        // own timestamp in case it disagrees with the map's bookkeeping.
        if !entry.is_fresh(self.clock.now_ms(), self.ttl_ms) {
            return None;
        }
        Some(entry.payload)
    }

    /// Stores a user's conversation list, overwriting any previous entry.
    ///
    /// The list is stored verbatim; whatever the caller fetched is what the
    /// next read gets back.
    pub fn set_user_conversations(
        &mut self,
        user_id: &str,
        conversations: Vec<ConversationSummary>,
    ) {
        let entry = CacheEntry::new(conversations, self.clock.now_ms());
        self.conversations.insert(user_key(user_id), entry);
    }

    /// Removes a user's conversation list. Idempotent.
    pub fn invalidate_user_conversations(&mut self, user_id: &str) {
        if self.conversations.remove(&user_key(user_id)) {
            debug!(user_id, "invalidated conversation list");
        }
    }

    // == Message Pages ==

    /// Returns the cached page for an exact (conversation, limit, offset)
    /// window, if present and fresh.
    ///
    /// Windows never satisfy each other's misses: a stored (20, 0) page does
    /// not answer a (50, 0) read even though the data overlaps.
    pub fn get_conversation_messages(
        &mut self,
        conversation_id: i64,
        limit: usize,
        offset: usize,
    ) -> Option<MessagePage> {
        let entry = self.messages.get(&page_key(conversation_id, limit, offset))?;
        if !entry.is_fresh(self.clock.now_ms(), self.ttl_ms) {
            return None;
        }
        Some(entry.payload)
    }

    /// Stores one page of a conversation's messages, overwriting any previous
    /// entry for the same window.
    pub fn set_conversation_messages(
        &mut self,
        conversation_id: i64,
        limit: usize,
        offset: usize,
        messages: Vec<Message>,
        pagination: Pagination,
    ) {
        let page = MessagePage {
            messages,
            pagination,
        };
        let entry = CacheEntry::new(page, self.clock.now_ms());
        self.messages
            .insert(page_key(conversation_id, limit, offset), entry);
    }

    /// Removes every cached page for a conversation, whatever its window.
    ///
    /// A write can shift the content of every page (a new message moves all
    /// offsets), so dropping anything narrower would be unsound.
    pub fn invalidate_conversation_messages(&mut self, conversation_id: i64) {
        let prefix = conversation_prefix(conversation_id);
        let stale_keys: Vec<String> = self
            .messages
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect();

        let dropped = stale_keys.len();
        for key in stale_keys {
            self.messages.remove(&key);
        }
        if dropped > 0 {
            debug!(conversation_id, dropped, "invalidated message pages");
        }
    }

    // == Write Hook ==

    /// The single hook write paths call after touching a conversation.
    ///
    /// Drops every message page for the conversation, then the conversation
    /// list of every affected user. The two steps are not atomic; losing the
    /// second one leaves at worst a stale list that the TTL heals.
    pub fn invalidate_on_new_message(&mut self, conversation_id: i64, affected_user_ids: &[String]) {
        self.invalidate_conversation_messages(conversation_id);
        for user_id in affected_user_ids {
            self.invalidate_user_conversations(user_id);
        }
    }

    // == Maintenance ==

    /// Current occupancy and counters for both namespaces.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            conversations: self.conversations.stats(),
            messages: self.messages.stats(),
        }
    }

    /// Drops every expired entry in both namespaces; returns how many.
    pub fn purge_expired(&mut self) -> usize {
        self.conversations.purge_expired() + self.messages.purge_expired()
    }

    /// Empties both namespaces. Every subsequent read is a miss, so this
    /// belongs in tests and maintenance windows, not on a live process.
    pub fn clear(&mut self) {
        self.conversations.clear();
        self.messages.clear();
    }
}
