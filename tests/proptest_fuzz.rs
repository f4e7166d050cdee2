//! Property-based tests for the cache tiers.
//!
//! Uses proptest to drive the local tier with random operation sequences
//! and verify its invariants hold: the capacity bound is never exceeded,
//! reads reflect the latest write, and config parsing never panics on
//! arbitrary input.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

use tiered_cache::{CacheConfig, LocalCache};

// =============================================================================
// Strategies
// =============================================================================

/// A small key space so sequences revisit keys (overwrites, LRU touches).
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,3}(\\.[a-z]{1,3}){0,2}"
}

#[derive(Debug, Clone)]
enum Op {
    Set(String, i64),
    Get(String),
    Delete(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key_strategy(), any::<i64>()).prop_map(|(k, v)| Op::Set(k, v)),
        key_strategy().prop_map(Op::Get),
        key_strategy().prop_map(Op::Delete),
    ]
}

/// Generate arbitrary JSON values for roundtrip checks
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".*".prop_map(Value::String),
    ];

    leaf.prop_recursive(4, 64, 10, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..10).prop_map(Value::Array),
            prop::collection::hash_map(".*", inner, 0..10)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// =============================================================================
// Local tier invariants
// =============================================================================

proptest! {
    /// The capacity bound holds across any operation sequence.
    #[test]
    fn local_capacity_never_exceeded(
        capacity in 1usize..16,
        ops in prop::collection::vec(op_strategy(), 0..200),
    ) {
        let cache = LocalCache::new(capacity, Duration::from_secs(60));

        for op in ops {
            match op {
                Op::Set(k, v) => cache.set(&k, json!(v), None),
                Op::Get(k) => { cache.get(&k); }
                Op::Delete(k) => { cache.delete(&k); }
            }
            prop_assert!(cache.len() <= capacity);
        }
    }

    /// A read immediately after a write returns the written value
    /// (long TTL, capacity 1 key larger than the write set).
    #[test]
    fn local_read_your_write(
        keys in prop::collection::hash_set(key_strategy(), 1..20),
        salt in any::<i64>(),
    ) {
        let cache = LocalCache::new(keys.len() + 1, Duration::from_secs(60));

        for (i, key) in keys.iter().enumerate() {
            let value = json!(salt.wrapping_add(i as i64));
            cache.set(key, value.clone(), None);
            prop_assert_eq!(cache.get(key), Some(value));
        }

        // Everything fits, so nothing was evicted
        prop_assert_eq!(cache.len(), keys.len());
        prop_assert_eq!(cache.evictions(), 0);
    }

    /// The most recently written key survives any overflow.
    #[test]
    fn local_newest_key_survives_eviction(
        capacity in 1usize..8,
        ops in prop::collection::vec((key_strategy(), any::<i64>()), 1..100),
    ) {
        let cache = LocalCache::new(capacity, Duration::from_secs(60));

        for (key, v) in &ops {
            cache.set(key, json!(v), None);
        }

        let (last_key, last_value) = ops.last().unwrap();
        prop_assert_eq!(cache.get(last_key), Some(json!(last_value)));
    }

    /// Deleted keys read as absent.
    #[test]
    fn local_delete_then_get_is_absent(
        keys in prop::collection::hash_set(key_strategy(), 1..10),
    ) {
        let cache = LocalCache::new(64, Duration::from_secs(60));

        for key in &keys {
            cache.set(key, json!(1), None);
        }
        for key in &keys {
            cache.delete(key);
            prop_assert_eq!(cache.get(key), None);
        }
        prop_assert!(cache.is_empty());
    }

    /// Arbitrary JSON values come back out of the cache unchanged.
    #[test]
    fn local_value_roundtrip(value in arbitrary_json_strategy()) {
        let cache = LocalCache::new(4, Duration::from_secs(60));
        cache.set("k", value.clone(), None);
        prop_assert_eq!(cache.get("k"), Some(value));
    }
}

// =============================================================================
// Config parsing fuzz
// =============================================================================

proptest! {
    /// CacheConfig deserialization never panics on arbitrary bytes.
    #[test]
    fn fuzz_config_from_random_bytes(bytes in prop::collection::vec(any::<u8>(), 0..2000)) {
        // Should never panic, only return Err
        let result: Result<CacheConfig, _> = serde_json::from_slice(&bytes);
        let _ = result;
    }

    /// CacheConfig deserialization handles arbitrary JSON gracefully.
    #[test]
    fn fuzz_config_from_arbitrary_json(json in arbitrary_json_strategy()) {
        let serialized = serde_json::to_vec(&json).unwrap();
        let result: Result<CacheConfig, _> = serde_json::from_slice(&serialized);
        // Either parses (if the JSON happens to match the config shape)
        // or fails cleanly
        let _ = result;
    }
}
