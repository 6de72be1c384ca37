//! Bounded TTL Map Module
//!
//! Generic bounded map combining HashMap storage with LRU tracking and
//! per-entry TTL expiry checked at read time.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::cache::{Clock, LruTracker, NamespaceStats};

// == Slot ==
/// Internal storage cell: the value plus the instant it was written.
#[derive(Debug, Clone)]
struct Slot<V> {
    value: V,
    inserted_at: u64,
}

// == TTL LRU Map ==
/// Bounded key-value map with LRU eviction and TTL expiry.
///
/// Holding at most `max_entries` live entries; inserting beyond that bound
/// evicts the least recently used key. Entries older than `ttl_ms` are
/// treated as absent and removed when a read touches them.
#[derive(Debug)]
pub struct TtlLruMap<K, V> {
    /// Key-value storage
    entries: HashMap<K, Slot<V>>,
    /// LRU access tracker
    lru: LruTracker<K>,
    /// Occupancy and performance counters
    stats: NamespaceStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Maximum entry age in milliseconds
    ttl_ms: u64,
    /// Time source for expiry checks
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlLruMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a new map with the given capacity, TTL and time source.
    pub fn new(max_entries: usize, ttl_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: NamespaceStats::new(max_entries),
            max_entries,
            ttl_ms,
            clock,
        }
    }

    // == Insert ==
    /// Stores a value under `key`, overwriting any previous entry.
    ///
    /// Overwriting resets the entry age. When the map is at capacity and the
    /// key is new, the least recently used entry is evicted first.
    pub fn insert(&mut self, key: K, value: V) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        let slot = Slot {
            value,
            inserted_at: self.clock.now_ms(),
        };
        self.entries.insert(key.clone(), slot);
        self.lru.touch(&key);
        self.stats.set_size(self.entries.len());
    }

    // == Get ==
    /// Retrieves the value for `key` if present and not expired.
    ///
    /// An expired entry is removed on the spot and reported as a miss, so a
    /// stale value can never leak out even if no cleanup pass has run.
    pub fn get(&mut self, key: &K) -> Option<V> {
        match self.entries.get(key) {
            Some(slot) => {
                let age = self.clock.now_ms().saturating_sub(slot.inserted_at);
                if age >= self.ttl_ms {
                    self.entries.remove(key);
                    self.lru.remove(key);
                    self.stats.set_size(self.entries.len());
                    self.stats.record_miss();
                    return None;
                }

                let value = slot.value.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes an entry, returning whether it was present.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_size(self.entries.len());
        }
        removed
    }

    // == Keys ==
    /// Returns a snapshot of every live key.
    ///
    /// Linear in the number of entries; fine at this capacity.
    pub fn keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, slot)| now.saturating_sub(slot.inserted_at) >= self.ttl_ms)
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.lru.remove(&key);
        }

        self.stats.set_size(self.entries.len());
        count
    }

    // == Clear ==
    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_size(0);
    }

    // == Stats ==
    /// Returns current counters with the size refreshed.
    pub fn stats(&self) -> NamespaceStats {
        let mut stats = self.stats.clone();
        stats.set_size(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries (expired ones included until
    /// a read or purge drops them).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Max Entries ==
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn test_map(max_entries: usize, ttl_ms: u64) -> (TtlLruMap<String, String>, Arc<ManualClock>) {
        let clock = ManualClock::new(0);
        let map = TtlLruMap::new(max_entries, ttl_ms, clock.clone());
        (map, clock)
    }

    #[test]
    fn test_map_new() {
        let (map, _) = test_map(100, 1_000);
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert_eq!(map.max_entries(), 100);
    }

    #[test]
    fn test_map_insert_and_get() {
        let (mut map, _) = test_map(100, 1_000);

        map.insert("key1".to_string(), "value1".to_string());

        assert_eq!(map.get(&"key1".to_string()), Some("value1".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_map_get_nonexistent() {
        let (mut map, _) = test_map(100, 1_000);
        assert_eq!(map.get(&"nope".to_string()), None);
        assert_eq!(map.stats().misses, 1);
    }

    #[test]
    fn test_map_overwrite_resets_age() {
        let (mut map, clock) = test_map(100, 1_000);

        map.insert("key1".to_string(), "old".to_string());
        clock.advance(900);
        map.insert("key1".to_string(), "new".to_string());
        clock.advance(900);

        // 1800ms after the first write but only 900ms after the overwrite.
        assert_eq!(map.get(&"key1".to_string()), Some("new".to_string()));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_map_remove() {
        let (mut map, _) = test_map(100, 1_000);

        map.insert("key1".to_string(), "value1".to_string());
        assert!(map.remove(&"key1".to_string()));

        assert!(map.is_empty());
        assert_eq!(map.get(&"key1".to_string()), None);
    }

    #[test]
    fn test_map_remove_nonexistent_is_noop() {
        let (mut map, _) = test_map(100, 1_000);
        assert!(!map.remove(&"nope".to_string()));
    }

    #[test]
    fn test_map_ttl_expiry_on_read() {
        let (mut map, clock) = test_map(100, 1_000);

        map.insert("key1".to_string(), "value1".to_string());

        clock.advance(999);
        assert!(map.get(&"key1".to_string()).is_some());

        clock.advance(1);
        // Exactly at TTL the entry is stale and gets dropped by the read.
        assert_eq!(map.get(&"key1".to_string()), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_map_lru_eviction() {
        let (mut map, _) = test_map(3, 1_000);

        map.insert("key1".to_string(), "v1".to_string());
        map.insert("key2".to_string(), "v2".to_string());
        map.insert("key3".to_string(), "v3".to_string());

        // Map is full, adding key4 should evict key1 (oldest)
        map.insert("key4".to_string(), "v4".to_string());

        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&"key1".to_string()), None);
        assert!(map.get(&"key2".to_string()).is_some());
        assert!(map.get(&"key3".to_string()).is_some());
        assert!(map.get(&"key4".to_string()).is_some());
        assert_eq!(map.stats().evictions, 1);
    }

    #[test]
    fn test_map_lru_touch_on_get() {
        let (mut map, _) = test_map(3, 1_000);

        map.insert("key1".to_string(), "v1".to_string());
        map.insert("key2".to_string(), "v2".to_string());
        map.insert("key3".to_string(), "v3".to_string());

        // Access key1 to make it most recently used
        map.get(&"key1".to_string());

        // Adding key4 should evict key2 (now oldest)
        map.insert("key4".to_string(), "v4".to_string());

        assert!(map.get(&"key1".to_string()).is_some());
        assert_eq!(map.get(&"key2".to_string()), None);
    }

    #[test]
    fn test_map_keys_snapshot() {
        let (mut map, _) = test_map(100, 1_000);

        map.insert("a".to_string(), "1".to_string());
        map.insert("b".to_string(), "2".to_string());

        let mut keys = map.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_map_purge_expired() {
        let (mut map, clock) = test_map(100, 1_000);

        map.insert("old".to_string(), "v".to_string());
        clock.advance(600);
        map.insert("young".to_string(), "v".to_string());
        clock.advance(500);

        // "old" is 1100ms old, "young" 500ms.
        let removed = map.purge_expired();
        assert_eq!(removed, 1);
        assert_eq!(map.len(), 1);
        assert!(map.get(&"young".to_string()).is_some());
    }

    #[test]
    fn test_map_clear() {
        let (mut map, _) = test_map(100, 1_000);

        map.insert("a".to_string(), "1".to_string());
        map.insert("b".to_string(), "2".to_string());
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.get(&"a".to_string()), None);
    }

    #[test]
    fn test_map_stats_track_hits_and_misses() {
        let (mut map, _) = test_map(100, 1_000);

        map.insert("key1".to_string(), "v".to_string());
        map.get(&"key1".to_string()); // hit
        map.get(&"nope".to_string()); // miss

        let stats = map.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.max_size, 100);
    }

    #[test]
    fn test_map_integer_keys() {
        let clock = ManualClock::new(0);
        let mut map: TtlLruMap<u64, Vec<u8>> = TtlLruMap::new(10, 1_000, clock);

        map.insert(7, vec![1, 2, 3]);
        assert_eq!(map.get(&7), Some(vec![1, 2, 3]));
    }
}
