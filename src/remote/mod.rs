//! Remote (shared) cache tiers.
//!
//! The [`RemoteCache`] trait is the seam between the manager and the
//! shared tier; [`RedisCache`] is the production implementation and
//! [`InMemoryRemote`] the in-process stand-in used in tests and when no
//! Redis URL is configured.

pub mod traits;
pub mod redis;
pub mod memory;

pub use traits::{CacheError, RemoteCache};
pub use redis::RedisCache;
pub use memory::InMemoryRemote;
