use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("remote backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("remote operation timed out")]
    Timeout,
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

/// A remote (shared, out-of-process) cache tier.
///
/// Implementations serialize values to a portable JSON encoding before
/// transmission. Failures are surfaced as [`CacheError`] and it is the
/// caller's job (the [`CacheManager`](crate::CacheManager)) to degrade
/// them to misses; implementations must not panic on backend trouble.
#[async_trait]
pub trait RemoteCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Fetch a key together with its remaining TTL, so callers promoting
    /// the value into a faster tier can cap the copy's lifetime at the
    /// backend's deadline. `None` TTL means the backend has no expiry
    /// (or cannot report one, as in this default implementation).
    async fn get_with_ttl(
        &self,
        key: &str,
    ) -> Result<Option<(Value, Option<Duration>)>, CacheError> {
        Ok(self.get(key).await?.map(|v| (v, None)))
    }

    /// Fetch a batch of keys; the result vec matches the input order.
    /// Default implementation falls back to sequential gets.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>, CacheError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.get(key).await?);
        }
        Ok(out)
    }

    /// Batch variant of [`get_with_ttl`](Self::get_with_ttl); the result
    /// vec matches the input order. Default implementation falls back to
    /// sequential lookups.
    async fn get_many_with_ttl(
        &self,
        keys: &[String],
    ) -> Result<Vec<Option<(Value, Option<Duration>)>>, CacheError> {
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            out.push(self.get_with_ttl(key).await?);
        }
        Ok(out)
    }

    /// Store a batch of entries under one TTL (pipelined for Redis).
    /// Returns the number written. Default implementation falls back to
    /// sequential sets.
    async fn set_many(
        &self,
        items: &[(String, Value)],
        ttl: Option<Duration>,
    ) -> Result<usize, CacheError> {
        for (key, value) in items {
            self.set(key, value, ttl).await?;
        }
        Ok(items.len())
    }
}
