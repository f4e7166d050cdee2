//! Configuration for the tiered cache.
//!
//! # Example
//!
//! ```
//! use tiered_cache::CacheConfig;
//!
//! // Minimal config (uses defaults, no remote tier)
//! let config = CacheConfig::default();
//! assert_eq!(config.local_capacity, 10_000);
//!
//! // Full config
//! let config = CacheConfig {
//!     redis_url: Some("redis://localhost:6379".into()),
//!     key_prefix: Some("myapp:".into()),
//!     local_capacity: 1_000,
//!     default_ttl_secs: 60,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;
use std::time::Duration;

/// Configuration for [`CacheManager`](crate::CacheManager).
///
/// All fields have sensible defaults. Without a `redis_url` the manager
/// runs with the local tier only.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis connection string (e.g., "redis://localhost:6379").
    /// `None` disables the remote tier.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Optional key prefix for namespacing a shared Redis instance
    /// (e.g., "myapp:" → "myapp:user.alice").
    #[serde(default)]
    pub key_prefix: Option<String>,

    /// Max number of entries in the local tier (default: 10,000).
    #[serde(default = "default_local_capacity")]
    pub local_capacity: usize,

    /// Default TTL in seconds, used when a caller passes no TTL (default: 300).
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Bound on each remote operation, in milliseconds (default: 250).
    /// A timed-out operation is reported as a miss by the manager.
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,

    /// Whether `set` writes through to the remote tier (default: true).
    /// When false, `set` populates the local tier only; results from
    /// `get_or_compute` are still stored in both tiers.
    #[serde(default = "default_write_through")]
    pub write_through: bool,
}

fn default_local_capacity() -> usize { 10_000 }
fn default_ttl_secs() -> u64 { 300 }
fn default_remote_timeout_ms() -> u64 { 250 }
fn default_write_through() -> bool { true }

impl CacheConfig {
    /// Default TTL as a [`Duration`].
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Remote operation timeout as a [`Duration`].
    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            key_prefix: None,
            local_capacity: default_local_capacity(),
            default_ttl_secs: default_ttl_secs(),
            remote_timeout_ms: default_remote_timeout_ms(),
            write_through: default_write_through(),
        }
    }
}
