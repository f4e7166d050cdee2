//! Local (in-process) cache tier.
//!
//! A bounded key→value store with lazy TTL expiry and LRU eviction.
//! All mutation is serialized through a single [`parking_lot::Mutex`];
//! nothing under the lock does I/O, so hold times are short.
//!
//! Expiry is checked on read: a `get` that finds an expired entry removes
//! it and reports a miss. There is no background sweep.

use std::collections::HashMap;
use std::time::Duration;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::entry::CacheEntry;

/// Entry plus the recency stamp used for LRU victim selection.
struct Slot {
    entry: CacheEntry,
    /// Monotonic stamp, refreshed on every hit. The live entry with the
    /// smallest stamp is the least recently used.
    touched: u64,
}

struct Inner {
    slots: HashMap<String, Slot>,
    /// Source of recency stamps, incremented on every insert and hit.
    tick: u64,
    evictions: u64,
}

/// Bounded in-process cache with TTL expiry and LRU eviction.
///
/// # Example
///
/// ```
/// use tiered_cache::LocalCache;
/// use std::time::Duration;
/// use serde_json::json;
///
/// let cache = LocalCache::new(100, Duration::from_secs(60));
/// cache.set("user.alice", json!({"role": "admin"}), None);
///
/// assert_eq!(cache.get("user.alice"), Some(json!({"role": "admin"})));
/// assert_eq!(cache.get("user.bob"), None);
/// ```
pub struct LocalCache {
    inner: Mutex<Inner>,
    capacity: usize,
    default_ttl: Duration,
}

impl LocalCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// `default_ttl` applies when `set` is called without an explicit TTL.
    /// Capacity 0 is bumped to 1 so a set is never a silent no-op.
    #[must_use]
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: HashMap::new(),
                tick: 0,
                evictions: 0,
            }),
            capacity: capacity.max(1),
            default_ttl,
        }
    }

    /// Look up a key.
    ///
    /// A hit refreshes the entry's LRU position and access count. An
    /// expired entry found here is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock();

        let expired = match inner.slots.get(key) {
            None => return None,
            Some(slot) => slot.entry.is_expired(),
        };

        if expired {
            inner.slots.remove(key);
            debug!(key, "expired entry removed on read");
            return None;
        }

        inner.tick += 1;
        let tick = inner.tick;
        let slot = inner.slots.get_mut(key)?;
        slot.touched = tick;
        slot.entry.record_access();
        Some(slot.entry.value.clone())
    }

    /// Insert or replace a value.
    ///
    /// When the cache is full and `key` is not already present, exactly one
    /// least-recently-used entry is evicted first. Expired entries are
    /// preferred as victims since they are logically absent already.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut inner = self.inner.lock();

        if !inner.slots.contains_key(key) && inner.slots.len() >= self.capacity {
            if let Some(victim) = Self::select_victim(&inner.slots) {
                inner.slots.remove(&victim);
                inner.evictions += 1;
                debug!(key = %victim, "evicted LRU entry");
                crate::metrics::record_eviction(1);
            }
        }

        inner.tick += 1;
        let touched = inner.tick;
        inner.slots.insert(
            key.to_string(),
            Slot {
                entry: CacheEntry::new(value, ttl),
                touched,
            },
        );
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().slots.remove(key).is_some()
    }

    /// Current entry count (including not-yet-evicted expired entries).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().slots.is_empty()
    }

    /// Configured capacity bound.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total entries evicted for capacity so far.
    #[must_use]
    pub fn evictions(&self) -> u64 {
        self.inner.lock().evictions
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.inner.lock().slots.clear();
    }

    /// Pick the eviction victim: any expired entry first, otherwise the
    /// entry with the oldest recency stamp.
    fn select_victim(slots: &HashMap<String, Slot>) -> Option<String> {
        if let Some((key, _)) = slots.iter().find(|(_, s)| s.entry.is_expired()) {
            return Some(key.clone());
        }
        slots
            .iter()
            .min_by_key(|(_, s)| s.touched)
            .map(|(key, _)| key.clone())
    }
}
