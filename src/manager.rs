// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache manager coordinating the two tiers.
//!
//! The [`CacheManager`] implements the cache-aside pattern over a local
//! in-process tier and an optional remote tier:
//!
//! ```text
//! get ──▶ local ──hit──▶ return
//!           │miss
//!           ▼
//!         remote ──hit──▶ populate local, return
//!           │miss / error (degraded to miss)
//!           ▼
//!         compute_fn (system of record) ──▶ store both tiers, return
//! ```
//!
//! Remote failures never surface to callers of the read path: a broken
//! or slow remote tier degrades to a miss. Compute-function errors are
//! propagated unmodified and nothing is cached for a failed computation.
//!
//! # Example
//!
//! ```rust,no_run
//! use tiered_cache::{CacheManager, CacheConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), tiered_cache::CacheError> {
//! let config = CacheConfig {
//!     redis_url: Some("redis://localhost:6379".into()),
//!     ..Default::default()
//! };
//! let cache = CacheManager::connect(config).await?;
//!
//! let user: serde_json::Value = cache
//!     .get_or_compute("user.alice", None, || async {
//!         // e.g. a database query
//!         Ok::<_, std::io::Error>(json!({"name": "Alice", "role": "admin"}))
//!     })
//!     .await
//!     .expect("system of record failed");
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::local::LocalCache;
use crate::remote::redis::RedisCache;
use crate::remote::traits::{CacheError, RemoteCache};

/// Snapshot of manager counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads answered by the local tier.
    pub local_hits: u64,
    /// Reads answered by the remote tier.
    pub remote_hits: u64,
    /// Reads that missed both tiers.
    pub misses: u64,
    /// System-of-record computations run by `get_or_compute`.
    pub computes: u64,
    /// LRU evictions from the local tier.
    pub local_evictions: u64,
    /// Current local tier entry count.
    pub local_entries: usize,
}

#[derive(Default)]
struct Counters {
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
    misses: AtomicU64,
    computes: AtomicU64,
}

/// Two-tier cache coordinator.
///
/// Construct one per process and share it by reference (`Arc`) across
/// request handlers. The manager is `Send + Sync`; the local tier
/// serializes its mutations internally and remote calls are async I/O.
pub struct CacheManager {
    config: CacheConfig,
    local: LocalCache,
    remote: Option<Arc<dyn RemoteCache>>,
    /// Direct Redis handle for health probes (None when the remote tier
    /// is absent or injected).
    redis: Option<Arc<RedisCache>>,
    counters: Counters,
}

impl CacheManager {
    /// Create a manager with the local tier only.
    ///
    /// Reads never consult a remote tier; useful for tests and
    /// single-process deployments.
    #[must_use]
    pub fn local_only(config: CacheConfig) -> Self {
        let local = LocalCache::new(config.local_capacity, config.default_ttl());
        Self {
            config,
            local,
            remote: None,
            redis: None,
            counters: Counters::default(),
        }
    }

    /// Create a manager with an injected remote tier.
    ///
    /// This is how tests plug in [`InMemoryRemote`](crate::InMemoryRemote)
    /// or a failing double.
    pub fn with_remote(config: CacheConfig, remote: Arc<dyn RemoteCache>) -> Self {
        let local = LocalCache::new(config.local_capacity, config.default_ttl());
        Self {
            config,
            local,
            remote: Some(remote),
            redis: None,
            counters: Counters::default(),
        }
    }

    /// Connect to the configured backends.
    ///
    /// With a `redis_url` this establishes the Redis connection (startup
    /// retry preset, fast-fail on bad config). Without one the manager
    /// runs local-only.
    pub async fn connect(config: CacheConfig) -> Result<Self, CacheError> {
        let (remote, redis): (Option<Arc<dyn RemoteCache>>, Option<Arc<RedisCache>>) =
            match config.redis_url {
                Some(ref url) => {
                    let store = RedisCache::connect_with_prefix(
                        url,
                        config.key_prefix.as_deref(),
                        config.remote_timeout(),
                    )
                    .await?;
                    info!(prefix = %store.prefix(), "connected remote cache tier");
                    let store = Arc::new(store);
                    (Some(store.clone() as Arc<dyn RemoteCache>), Some(store))
                }
                None => {
                    info!("no redis_url configured, running local tier only");
                    (None, None)
                }
            };

        let local = LocalCache::new(config.local_capacity, config.default_ttl());
        Ok(Self {
            config,
            local,
            remote,
            redis,
            counters: Counters::default(),
        })
    }

    /// Look up a key: local tier first, then remote.
    ///
    /// A remote hit re-populates the local tier, capped at the remote
    /// entry's remaining TTL so the promoted copy cannot outlive the
    /// shared one. Remote errors and timeouts are logged and degrade to
    /// a miss.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let start = Instant::now();

        if let Some(value) = self.local.get(key) {
            self.counters.local_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "local hit");
            crate::metrics::record_operation("local", "get", "hit");
            crate::metrics::record_latency("local", "get", start.elapsed());
            return Some(value);
        }
        crate::metrics::record_operation("local", "get", "miss");

        if let Some((value, remaining)) = self.remote_get(key).await {
            self.counters.remote_hits.fetch_add(1, Ordering::Relaxed);
            debug!(key, "remote hit, promoted to local");
            self.local.set(key, value.clone(), self.promotion_ttl(remaining));
            crate::metrics::record_latency("remote", "get", start.elapsed());
            return Some(value);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key, "cache miss");
        None
    }

    /// Store a value in the cache.
    ///
    /// The local tier is written always; the remote tier only when
    /// write-through is enabled. Both tiers get the default TTL when the
    /// caller passes none, so a remote copy never outlives the entry's
    /// expiry. Remote set failures are logged and swallowed (best effort).
    pub async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        self.local.set(key, value.clone(), ttl);
        crate::metrics::record_operation("local", "set", "success");

        if !self.config.write_through {
            return;
        }
        self.remote_set(key, &value, ttl.or(Some(self.config.default_ttl())))
            .await;
    }

    /// Read through the cache, computing on a double miss.
    ///
    /// Tier order: local → remote → `compute`. A computed value is stored
    /// in both tiers before returning. Errors from `compute` propagate
    /// unmodified and nothing is cached for them, so the next call will
    /// compute again.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let start = Instant::now();
        self.counters.computes.fetch_add(1, Ordering::Relaxed);
        let value = match compute().await {
            Ok(value) => {
                crate::metrics::record_compute("success");
                value
            }
            Err(e) => {
                crate::metrics::record_compute("error");
                return Err(e);
            }
        };
        debug!(key, elapsed_ms = start.elapsed().as_millis() as u64, "computed value on double miss");

        self.local.set(key, value.clone(), ttl);
        self.remote_set(key, &value, ttl.or(Some(self.config.default_ttl()))).await;

        Ok(value)
    }

    /// Remove a key from both tiers.
    ///
    /// Returns whether the key was present in the local tier. Remote
    /// delete failures are logged and swallowed; other processes' local
    /// copies stay stale until their TTL elapses (accepted by design).
    pub async fn invalidate(&self, key: &str) -> bool {
        let found = self.local.delete(key);
        crate::metrics::record_operation("local", "delete", "success");

        if let Some(ref remote) = self.remote {
            match remote.delete(key).await {
                Ok(()) => {
                    debug!(key, "invalidated remote entry");
                    crate::metrics::record_operation("remote", "delete", "success");
                }
                Err(e) => {
                    warn!(key, error = %e, "remote invalidation failed");
                    crate::metrics::record_operation("remote", "delete", "error");
                }
            }
        }

        found
    }

    /// Batched lookup.
    ///
    /// Results match the input key order. Local hits are answered
    /// in-process; the remainder is fetched from the remote tier in one
    /// batched call and promoted to local. A failed remote batch degrades
    /// to misses for all remaining keys.
    pub async fn get_many(&self, keys: &[String]) -> Vec<Option<Value>> {
        let mut results: Vec<Option<Value>> = Vec::with_capacity(keys.len());
        let mut remote_idx: Vec<usize> = Vec::new();

        for (i, key) in keys.iter().enumerate() {
            match self.local.get(key) {
                Some(value) => {
                    self.counters.local_hits.fetch_add(1, Ordering::Relaxed);
                    crate::metrics::record_operation("local", "get_many", "hit");
                    results.push(Some(value));
                }
                None => {
                    crate::metrics::record_operation("local", "get_many", "miss");
                    remote_idx.push(i);
                    results.push(None);
                }
            }
        }

        if remote_idx.is_empty() {
            return results;
        }

        let Some(ref remote) = self.remote else {
            self.counters
                .misses
                .fetch_add(remote_idx.len() as u64, Ordering::Relaxed);
            return results;
        };

        let remote_keys: Vec<String> = remote_idx.iter().map(|&i| keys[i].clone()).collect();
        match remote.get_many_with_ttl(&remote_keys).await {
            Ok(values) => {
                for (&i, value) in remote_idx.iter().zip(values) {
                    match value {
                        Some((value, remaining)) => {
                            self.counters.remote_hits.fetch_add(1, Ordering::Relaxed);
                            crate::metrics::record_operation("remote", "get_many", "hit");
                            self.local.set(&keys[i], value.clone(), self.promotion_ttl(remaining));
                            results[i] = Some(value);
                        }
                        None => {
                            self.counters.misses.fetch_add(1, Ordering::Relaxed);
                            crate::metrics::record_operation("remote", "get_many", "miss");
                        }
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, keys = remote_keys.len(), "remote batch get failed, degrading to misses");
                crate::metrics::record_operation("remote", "get_many", "error");
                self.counters
                    .misses
                    .fetch_add(remote_idx.len() as u64, Ordering::Relaxed);
            }
        }

        results
    }

    /// Probe remote tier connectivity (PING).
    ///
    /// Returns `(connected, latency_ms)`; both `None` when no Redis
    /// backend is configured. Suitable for `/health` endpoints.
    pub async fn ping_remote(&self) -> (Option<bool>, Option<u64>) {
        let Some(ref redis) = self.redis else {
            return (None, None);
        };

        let start = Instant::now();
        let mut conn = redis.connection();

        let result: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        match result {
            Ok(_) => (Some(true), Some(start.elapsed().as_millis() as u64)),
            Err(_) => (Some(false), None),
        }
    }

    /// Snapshot the manager counters and local tier occupancy.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            local_hits: self.counters.local_hits.load(Ordering::Relaxed),
            remote_hits: self.counters.remote_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            computes: self.counters.computes.load(Ordering::Relaxed),
            local_evictions: self.local.evictions(),
            local_entries: self.local.len(),
        }
    }

    /// Update gauge metrics with current tier state.
    ///
    /// Call before snapshotting metrics for export.
    pub fn update_gauge_metrics(&self) {
        let entries = self.local.len();
        crate::metrics::set_local_entries(entries);
        crate::metrics::set_local_fill(entries as f64 / self.local.capacity() as f64);
    }

    /// Direct access to the local tier (for diagnostics).
    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    // --- Internal helpers ---

    /// TTL for a value promoted from the remote tier into the local one:
    /// the remote's remaining lifetime, capped at the default TTL. An
    /// unknown remainder falls back to the local default.
    fn promotion_ttl(&self, remaining: Option<Duration>) -> Option<Duration> {
        Some(match remaining {
            Some(r) => r.min(self.config.default_ttl()),
            None => self.config.default_ttl(),
        })
    }

    /// Remote read with all failures degraded to a miss.
    async fn remote_get(&self, key: &str) -> Option<(Value, Option<Duration>)> {
        let remote = self.remote.as_ref()?;

        match remote.get_with_ttl(key).await {
            Ok(Some(hit)) => {
                crate::metrics::record_operation("remote", "get", "hit");
                Some(hit)
            }
            Ok(None) => {
                crate::metrics::record_operation("remote", "get", "miss");
                None
            }
            Err(CacheError::Timeout) => {
                warn!(key, "remote get timed out, treating as miss");
                crate::metrics::record_operation("remote", "get", "timeout");
                None
            }
            Err(e) => {
                warn!(key, error = %e, "remote get failed, treating as miss");
                crate::metrics::record_operation("remote", "get", "error");
                None
            }
        }
    }

    /// Best-effort remote write; failures are logged and swallowed.
    async fn remote_set(&self, key: &str, value: &Value, ttl: Option<Duration>) {
        let Some(ref remote) = self.remote else {
            return;
        };

        match remote.set(key, value, ttl).await {
            Ok(()) => {
                crate::metrics::record_operation("remote", "set", "success");
            }
            Err(e) => {
                warn!(key, error = %e, "remote set failed (best effort)");
                crate::metrics::record_operation("remote", "set", "error");
            }
        }
    }
}
