//! # Tiered Cache
//!
//! A two-tier cache for read-heavy services: a bounded in-process tier in
//! front of a shared Redis tier, coordinated with the cache-aside pattern.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CacheManager                          │
//! │  • get / set / get_or_compute / invalidate / get_many       │
//! │  • Degrades remote failures to cache misses                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Local tier (in-process)                    │
//! │  • Bounded capacity, LRU eviction                           │
//! │  • Lazy TTL expiry on read                                  │
//! │  • Mutex-serialized, no I/O under the lock                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                         (on miss)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Remote tier (Redis)                       │
//! │  • JSON-serialized values, SETEX TTLs                       │
//! │  • Pipelined batch reads/writes                             │
//! │  • Bounded operation timeout, retry on transient failure    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                      (on double miss)
//!                              ▼
//!                compute_fn (system of record)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiered_cache::{CacheManager, CacheConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tiered_cache::CacheError> {
//!     let config = CacheConfig {
//!         redis_url: Some("redis://localhost:6379".into()),
//!         local_capacity: 10_000,
//!         ..Default::default()
//!     };
//!     let cache = CacheManager::connect(config).await?;
//!
//!     // Cache-aside read: local → Redis → system of record
//!     let user = cache
//!         .get_or_compute("user.alice", None, || async {
//!             Ok::<_, std::io::Error>(json!({"name": "Alice"}))
//!         })
//!         .await
//!         .expect("compute failed");
//!     println!("{user}");
//!
//!     // Drop staleness after a write to the system of record
//!     cache.invalidate("user.alice").await;
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! - Remote connectivity errors and timeouts degrade to misses on the
//!   read path; the caller falls through to the system of record.
//! - Remote `set` failures are logged and swallowed (best effort).
//! - Compute-function errors propagate to the caller unmodified; nothing
//!   is cached for a failed computation.
//! - No cross-tier consistency guarantee: after `invalidate`, other
//!   processes' local copies stay stale until their TTL elapses.
//!
//! ## Modules
//!
//! - [`manager`]: The [`CacheManager`] coordinating the tiers
//! - [`local`]: Bounded in-process tier with TTL + LRU
//! - [`remote`]: The [`RemoteCache`] seam, Redis and in-memory tiers
//! - [`resilience`]: Retry with exponential backoff
//! - [`metrics`]: `metrics`-facade instrumentation

pub mod config;
pub mod entry;
pub mod local;
pub mod remote;
pub mod manager;
pub mod resilience;
pub mod metrics;

pub use config::CacheConfig;
pub use entry::CacheEntry;
pub use local::LocalCache;
pub use manager::{CacheManager, CacheStats};
pub use remote::{CacheError, InMemoryRemote, RedisCache, RemoteCache};
pub use resilience::retry::RetryConfig;
