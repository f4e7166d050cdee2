//! Redis remote tier.
//!
//! Values are serialized to JSON text before transmission and parsed back
//! on read, so entries stay inspectable (`GET key`) and portable across
//! clients. TTLs map to `SET EX`; batch writes are pipelined.
//!
//! Every command runs under the configured operation timeout and the
//! teacher-grade retry presets: a timed-out or exhausted operation comes
//! back as an error for the manager to degrade to a miss.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, pipe};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

use super::traits::{CacheError, RemoteCache};
use crate::resilience::retry::{retry, RetryConfig};

pub struct RedisCache {
    connection: ConnectionManager,
    /// Optional key prefix for namespacing (e.g., "myapp:" → "myapp:user.alice")
    prefix: String,
    /// Bound applied to each command attempt.
    op_timeout: Duration,
}

impl RedisCache {
    /// Connect to Redis without a key prefix.
    pub async fn connect(connection_string: &str, op_timeout: Duration) -> Result<Self, CacheError> {
        Self::connect_with_prefix(connection_string, None, op_timeout).await
    }

    /// Connect to Redis with an optional key prefix.
    ///
    /// The prefix is prepended to all keys, enabling namespacing when
    /// sharing a Redis instance with other applications. Connection uses
    /// the startup retry preset: fast-fail rather than hang forever on a
    /// bad URL.
    pub async fn connect_with_prefix(
        connection_string: &str,
        prefix: Option<&str>,
        op_timeout: Duration,
    ) -> Result<Self, CacheError> {
        let client = Client::open(connection_string)
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        let connection = retry("redis_connect", &RetryConfig::startup(), || async {
            ConnectionManager::new(client.clone()).await
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::Backend(e.to_string()))?;

        Ok(Self {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
            op_timeout,
        })
    }

    /// Apply the prefix to a key.
    #[inline]
    fn prefixed_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    /// Get the configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get a clone of the connection manager (for health probes).
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    /// Run one command attempt under the operation timeout.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(CacheError::Backend(e.to_string())),
            Err(_) => Err(CacheError::Timeout),
        }
    }

    /// TTL in whole seconds for `SET EX` (rounded up, minimum 1s).
    fn ttl_secs(ttl: Duration) -> u64 {
        (ttl.as_millis() as u64).div_ceil(1000).max(1)
    }

    /// Map a PTTL reply to a remaining duration.
    /// -1 means no expiry, -2 means no such key; both report `None`.
    fn remaining_from_pttl(pttl_ms: i64) -> Option<Duration> {
        u64::try_from(pttl_ms).ok().map(Duration::from_millis)
    }
}

#[async_trait]
impl RemoteCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);

        let raw: Option<String> = retry("redis_get", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            async move { self.bounded(async move { conn.get(&key).await }).await }
        })
        .await?;

        match raw {
            Some(s) => serde_json::from_str(&s).map(Some).map_err(Into::into),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<(), CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);
        let data = serde_json::to_string(value)?;

        retry("redis_set", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            let data = data.clone();
            async move {
                self.bounded(async move {
                    match ttl {
                        Some(t) => conn.set_ex(&key, &data, Self::ttl_secs(t)).await,
                        None => conn.set(&key, &data).await,
                    }
                })
                .await
            }
        })
        .await
    }

    /// GET plus PTTL in one pipeline, so promotions can cap the local
    /// copy's lifetime at the Redis deadline.
    async fn get_with_ttl(
        &self,
        key: &str,
    ) -> Result<Option<(Value, Option<Duration>)>, CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);

        let (raw, pttl_ms): (Option<String>, i64) =
            retry("redis_get_pttl", &RetryConfig::query(), || {
                let mut conn = conn.clone();
                let key = prefixed.clone();
                async move {
                    self.bounded(async move {
                        pipe()
                            .get(&key)
                            .cmd("PTTL")
                            .arg(&key)
                            .query_async(&mut conn)
                            .await
                    })
                    .await
                }
            })
            .await?;

        match raw {
            Some(s) => {
                let value: Value = serde_json::from_str(&s)?;
                Ok(Some((value, Self::remaining_from_pttl(pttl_ms))))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let conn = self.connection.clone();
        let prefixed = self.prefixed_key(key);

        retry("redis_delete", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let key = prefixed.clone();
            async move { self.bounded(async move { conn.del(&key).await }).await }
        })
        .await
    }

    /// Batched fetch via MGET. A corrupt stored value is logged and
    /// reported as a miss for that key rather than failing the batch.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<Value>>, CacheError> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let conn = self.connection.clone();
        let prefixed: Vec<String> = keys.iter().map(|k| self.prefixed_key(k)).collect();

        let raw: Vec<Option<String>> = retry("redis_mget", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let prefixed = prefixed.clone();
            async move { self.bounded(async move { conn.mget(&prefixed).await }).await }
        })
        .await?;

        let values = raw
            .into_iter()
            .zip(keys)
            .map(|(slot, key)| {
                slot.and_then(|s| match serde_json::from_str(&s) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!(key = %key, error = %e, "discarding unparseable cached value");
                        None
                    }
                })
            })
            .collect();

        Ok(values)
    }

    /// Batched fetch with remaining TTLs: MGET for the values, then one
    /// pipelined PTTL round trip for the keys that hit.
    async fn get_many_with_ttl(
        &self,
        keys: &[String],
    ) -> Result<Vec<Option<(Value, Option<Duration>)>>, CacheError> {
        let values = self.get_many(keys).await?;

        let hit_keys: Vec<String> = keys
            .iter()
            .zip(&values)
            .filter(|(_, v)| v.is_some())
            .map(|(k, _)| self.prefixed_key(k))
            .collect();

        if hit_keys.is_empty() {
            return Ok(values.into_iter().map(|_| None).collect());
        }

        let conn = self.connection.clone();
        let pttls: Vec<i64> = retry("redis_pttl_batch", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let hit_keys = hit_keys.clone();
            async move {
                self.bounded(async move {
                    let mut pipeline = pipe();
                    for key in &hit_keys {
                        pipeline.cmd("PTTL").arg(key);
                    }
                    pipeline.query_async(&mut conn).await
                })
                .await
            }
        })
        .await?;

        let mut pttls = pttls.into_iter();
        Ok(values
            .into_iter()
            .map(|slot| {
                slot.map(|value| {
                    let remaining = pttls.next().and_then(Self::remaining_from_pttl);
                    (value, remaining)
                })
            })
            .collect())
    }

    /// Pipelined batch write (one round trip for the whole batch).
    async fn set_many(
        &self,
        items: &[(String, Value)],
        ttl: Option<Duration>,
    ) -> Result<usize, CacheError> {
        if items.is_empty() {
            return Ok(0);
        }

        let prepared: Result<Vec<(String, String)>, CacheError> = items
            .iter()
            .map(|(key, value)| {
                let data = serde_json::to_string(value)?;
                Ok((self.prefixed_key(key), data))
            })
            .collect();
        let prepared = prepared?;
        let count = prepared.len();

        let conn = self.connection.clone();

        retry("redis_set_many", &RetryConfig::query(), || {
            let mut conn = conn.clone();
            let prepared = prepared.clone();
            async move {
                self.bounded(async move {
                    let mut pipeline = pipe();
                    for (key, data) in &prepared {
                        match ttl {
                            Some(t) => {
                                pipeline.cmd("SETEX").arg(key).arg(Self::ttl_secs(t)).arg(data);
                            }
                            None => {
                                pipeline.set(key, data);
                            }
                        }
                    }
                    pipeline.query_async::<()>(&mut conn).await
                })
                .await
            }
        })
        .await?;

        Ok(count)
    }
}
