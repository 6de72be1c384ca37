//! Cache Statistics Module
//!
//! Tracks per-namespace occupancy and performance counters.

use serde::Serialize;

// == Namespace Stats ==
/// Occupancy and performance counters for one cache namespace.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceStats {
    /// Current number of live entries
    pub size: usize,
    /// Maximum number of entries the namespace can hold
    pub max_size: usize,
    /// Number of fresh reads served from the namespace
    pub hits: u64,
    /// Number of reads that found nothing usable (absent or stale)
    pub misses: u64,
    /// Number of entries evicted to stay within capacity
    pub evictions: u64,
}

impl NamespaceStats {
    // == Constructor ==
    /// Creates counters for a namespace with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have happened.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Size ==
    pub fn set_size(&mut self, size: usize) {
        self.size = size;
    }
}

// == Cache Stats ==
/// Combined statistics for both cache namespaces.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Conversation-list namespace
    pub conversations: NamespaceStats,
    /// Message-page namespace
    pub messages: NamespaceStats,
}
