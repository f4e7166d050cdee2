use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};
use super::traits::{CacheError, RemoteCache};

/// In-memory remote tier.
///
/// Stands in for Redis in tests and in single-process deployments where
/// no `redis_url` is configured but manager semantics (TTL on the shared
/// tier, batch fetches) should still hold. Expiry is lazy, checked on read.
pub struct InMemoryRemote {
    data: DashMap<String, (Value, Option<Instant>)>,
}

impl InMemoryRemote {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Get current entry count (including not-yet-removed expired entries).
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.data.clear();
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteCache for InMemoryRemote {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let expired = match self.data.get(key) {
            None => return Ok(None),
            Some(r) => match r.value().1 {
                Some(deadline) => Instant::now() >= deadline,
                None => false,
            },
        };

        if expired {
            self.data.remove(key);
            return Ok(None);
        }

        Ok(self.data.get(key).map(|r| r.value().0.clone()))
    }

    async fn get_with_ttl(
        &self,
        key: &str,
    ) -> Result<Option<(Value, Option<Duration>)>, CacheError> {
        if self.get(key).await?.is_none() {
            return Ok(None);
        }

        Ok(self.data.get(key).map(|r| {
            let (value, deadline) = r.value();
            let remaining = deadline.map(|d| d.saturating_duration_since(Instant::now()));
            (value.clone(), remaining)
        }))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let deadline = ttl.map(|t| Instant::now() + t);
        self.data.insert(key.to_string(), (value.clone(), deadline));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.data.remove(key);
        Ok(())
    }
}
