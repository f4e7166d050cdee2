//! Cache entry data structure.
//!
//! A [`CacheEntry`] wraps a cached value with the metadata needed for
//! TTL expiry and LRU victim selection: creation instant, time-to-live,
//! last access, and access count.
//!
//! Expiry is a *read-time predicate*: an entry past its TTL is logically
//! absent even before it has been physically removed. There is no
//! background sweep; [`LocalCache`](crate::LocalCache) removes expired
//! entries lazily when a read finds them.

use std::time::{Duration, Instant};
use serde_json::Value;

/// A cached value plus expiry and recency metadata.
///
/// # Example
///
/// ```
/// use tiered_cache::CacheEntry;
/// use std::time::Duration;
/// use serde_json::json;
///
/// let entry = CacheEntry::new(json!({"name": "Alice"}), Duration::from_secs(60));
/// assert!(!entry.is_expired());
/// assert_eq!(entry.access_count, 0);
/// ```
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached payload.
    pub value: Value,
    /// When the entry was created.
    pub created_at: Instant,
    /// How long the entry stays visible after creation.
    pub ttl: Duration,
    /// When the entry was last read.
    pub last_accessed: Instant,
    /// Number of reads that hit this entry.
    pub access_count: u64,
}

impl CacheEntry {
    /// Create a new entry, visible for `ttl` from now.
    #[must_use]
    pub fn new(value: Value, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            ttl,
            last_accessed: now,
            access_count: 0,
        }
    }

    /// Whether the entry has outlived its TTL.
    ///
    /// Expired entries are treated as absent by readers regardless of
    /// whether they have been evicted yet.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }

    /// Time remaining before expiry (zero if already expired).
    #[must_use]
    pub fn remaining_ttl(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }

    /// Record a read: bump the access count and refresh recency.
    pub fn record_access(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count = self.access_count.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry() {
        let entry = CacheEntry::new(json!({"key": "value"}), Duration::from_secs(30));

        assert_eq!(entry.value, json!({"key": "value"}));
        assert_eq!(entry.ttl, Duration::from_secs(30));
        assert_eq!(entry.access_count, 0);
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(json!(1), Duration::ZERO);
        assert!(entry.is_expired());
        assert_eq!(entry.remaining_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_expiry_after_ttl() {
        let entry = CacheEntry::new(json!(1), Duration::from_millis(10));
        assert!(!entry.is_expired());

        std::thread::sleep(Duration::from_millis(15));
        assert!(entry.is_expired());
    }

    #[test]
    fn test_remaining_ttl_decreases() {
        let entry = CacheEntry::new(json!(1), Duration::from_secs(60));
        let first = entry.remaining_ttl();

        std::thread::sleep(Duration::from_millis(5));
        let second = entry.remaining_ttl();

        assert!(second < first);
        assert!(second > Duration::from_secs(59));
    }

    #[test]
    fn test_record_access() {
        let mut entry = CacheEntry::new(json!(1), Duration::from_secs(60));
        let created_access = entry.last_accessed;

        std::thread::sleep(Duration::from_millis(2));
        entry.record_access();
        entry.record_access();

        assert_eq!(entry.access_count, 2);
        assert!(entry.last_accessed > created_access);
    }

    #[test]
    fn test_access_does_not_extend_ttl() {
        let mut entry = CacheEntry::new(json!(1), Duration::from_millis(20));

        std::thread::sleep(Duration::from_millis(12));
        entry.record_access();
        std::thread::sleep(Duration::from_millis(12));

        // Recency changed but expiry is anchored to created_at
        assert!(entry.is_expired());
    }
}
