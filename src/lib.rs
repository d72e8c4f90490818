// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! # thumbbase: an in-memory key-value store with nested transactions
//!
//! This crate provides a small, single-threaded key-value engine built from three parts:
//!
//! - [`ValueCountIndex`]: a reverse index answering "how many keys currently hold this value?"
//!   in constant time.
//! - [`Storage`]: the key→value mapping. Every mutation keeps the index in step with the
//!   mapping.
//! - [`TransactionStack`](transaction::TransactionStack): nested `begin`/`commit`/`rollback`
//!   blocks. Each mutation made inside a transaction is journaled, and rollback undoes the
//!   innermost block by replaying inverse operations through the storage.
//!
//! [`KeyValueStore`] composes these into the operation set most callers want.
//!
//! ## Absent vs. falsy
//!
//! A key that was never set, or has been unset, reads back as `None`. There is no null
//! [`Value`], so `0`, `false` and `""` are ordinary values that read back unchanged and are
//! counted by the index like any other.
//!
//! ## Getting Started
//!
//! ```rust
//! use thumbbase::{KeyValueStore, Value};
//!
//! let mut store = KeyValueStore::<String>::new();
//!
//! store.begin();
//! store.set("a", 30)?;
//! store.begin();
//! store.set("a", 40)?;
//! assert_eq!(store.get("a"), Some(&Value::from(40)));
//!
//! store.rollback()?;
//! assert_eq!(store.num_equal_to(&Value::from(40)), 0);
//! assert_eq!(store.get("a"), Some(&Value::from(30)));
//! assert_eq!(store.num_equal_to(&Value::from(30)), 1);
//! # Ok::<(), thumbbase::Error>(())
//! ```
//!
//! ## Commit and Rollback
//!
//! `commit` closes *all* open transactions at once and keeps their changes. `rollback` only
//! undoes the innermost one; outer transactions stay open. Rolling back with nothing open
//! returns [`Error::NoTransaction`]. See the [`transaction`] module for the details.
//!
//! ## Scope of this Crate
//!
//! Data lives in memory only and is owned by a single caller; there is no persistence, no
//! sharing between threads, and no network protocol. The [`command`] module and the
//! `thumbbase` binary (behind the `cli` feature) provide a line-oriented shell on top.
//!
//! ## Features
//!
//! - `serde`: Provides `serde` support for [`Value`] and [`Config`].
//! - `arbitrary`: Implements `quickcheck::Arbitrary` for [`Value`], useful for property-based
//!   testing.
//! - `cli`: Builds the `thumbbase` interactive shell.
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

use ahash::RandomState;
use std::{
    hash::BuildHasher,
    sync::atomic::{AtomicBool, Ordering},
};

// Use a constant seed for hashing to make performance benchmarks have less variance.
pub(crate) const DETERMINISTIC_HASHER: RandomState = RandomState::with_seeds(48, 1516, 23, 42);

pub mod command;
mod config;
pub use config::{Config, RollbackGuard};
mod error;
pub use error::{Error, Result};
mod index;
pub use index::ValueCountIndex;
mod storage;
pub use storage::Storage;
mod store;
pub use store::KeyValueStore;
pub mod transaction;
mod value;
pub use value::Value;

static ENABLE_DETERMINISM: AtomicBool = AtomicBool::new(false);

/// Makes all hash maps in this crate use a fixed seed.
///
/// This should only be enabled for testing, as it increases the odds of DoS
/// scenarios.
#[doc(hidden)]
pub fn enable_determinism() {
    ENABLE_DETERMINISM.store(true, Ordering::Release);
}

/// Checks if determinism is enabled.
///
/// Should be used internally and for testing.
#[doc(hidden)]
pub fn determinism_enabled() -> bool {
    ENABLE_DETERMINISM.load(Ordering::Acquire)
}

/// Create a random state for a hashmap.
/// If `enable_determinism` has been used, this will return a deterministic
/// decidedly non-random RandomState, useful in tests.
#[inline]
fn make_random_state() -> RandomState {
    if determinism_enabled() {
        DETERMINISTIC_HASHER
    } else {
        RandomState::new()
    }
}

fn create_map<K, V>() -> std::collections::HashMap<K, V, StoreRandomState> {
    std::collections::HashMap::with_hasher(StoreRandomState::default())
}

fn create_map_with_capacity<K, V>(
    capacity: usize,
) -> std::collections::HashMap<K, V, StoreRandomState> {
    std::collections::HashMap::with_capacity_and_hasher(capacity, StoreRandomState::default())
}

/// This is a small wrapper around the ahash RandomState.
/// This allows us to easily switch to a non-random RandomState for use in tests.
#[derive(Clone)]
pub struct StoreRandomState {
    inner: RandomState,
}

// Falls back on a regular ahash::RandomState except when 'enable_determinism' has been
// called, in which case a static only-for-test RandomState is used.
impl Default for StoreRandomState {
    #[inline]
    fn default() -> Self {
        Self {
            inner: make_random_state(),
        }
    }
}

impl BuildHasher for StoreRandomState {
    type Hasher = <RandomState as BuildHasher>::Hasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        self.inner.build_hasher()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{Arbitrary, Gen};
    use std::collections::HashMap;

    /// Operations the property tests drive the store with.
    #[derive(Debug, Clone)]
    enum Op {
        Set(u8, Value),
        Unset(u8),
        Begin,
        Commit,
        Rollback,
    }

    impl Arbitrary for Op {
        fn arbitrary(g: &mut Gen) -> Self {
            // few keys, so that overwrites and unsets hit existing entries
            let key = u8::arbitrary(g) % 4;
            match *g
                .choose(&["set", "set", "set", "unset", "begin", "commit", "rollback"])
                .unwrap()
            {
                "set" => Op::Set(key, Value::arbitrary(g)),
                "unset" => Op::Unset(key),
                "begin" => Op::Begin,
                "commit" => Op::Commit,
                "rollback" => Op::Rollback,
                _ => unreachable!(),
            }
        }
    }

    fn assert_index_consistent(store: &KeyValueStore<u8>) {
        let mut expected = HashMap::<&Value, usize>::new();
        for (_, value) in store.storage().iter() {
            *expected.entry(value).or_default() += 1;
        }
        for (value, count) in &expected {
            assert_eq!(store.num_equal_to(value), *count, "count of {value:?}");
        }
        assert!(store.storage().index().len() >= expected.len());
    }

    fn snapshot(store: &KeyValueStore<u8>) -> HashMap<u8, Value> {
        store
            .storage()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect()
    }

    #[quickcheck]
    fn index_matches_storage(ops: Vec<Op>) {
        let mut store = KeyValueStore::<u8>::new();
        for op in ops {
            match op {
                Op::Set(key, value) => store.set(key, value).unwrap(),
                Op::Unset(key) => store.unset(&key).unwrap(),
                Op::Begin => store.begin(),
                Op::Commit => store.commit(),
                Op::Rollback => {
                    let open = store.is_writing_transactions();
                    assert_eq!(store.rollback().is_ok(), open);
                }
            }
            assert_index_consistent(&store);
        }
    }

    #[quickcheck]
    fn rollback_restores_state_before_begin(before: Vec<(u8, Value)>, inside: Vec<Op>) {
        let mut store = KeyValueStore::<u8>::new();
        for (key, value) in before {
            store.set(key % 4, value).unwrap();
        }
        let expected = snapshot(&store);
        let expected_counts: Vec<_> = expected
            .values()
            .map(|v| (v.clone(), store.num_equal_to(v)))
            .collect();

        store.begin();
        for op in inside {
            match op {
                Op::Set(key, value) => store.set(key, value).unwrap(),
                Op::Unset(key) => store.unset(&key).unwrap(),
                // keep the outer transaction open; nested ones are fair game
                Op::Begin => store.begin(),
                Op::Commit | Op::Rollback if store.depth() > 1 => store.rollback().unwrap(),
                Op::Commit | Op::Rollback => {}
            }
        }
        while store.depth() > 0 {
            store.rollback().unwrap();
        }

        assert_eq!(snapshot(&store), expected);
        for (value, count) in expected_counts {
            assert_eq!(store.num_equal_to(&value), count);
        }
        assert_index_consistent(&store);
    }

    #[test]
    fn deterministic_state_is_reproducible() {
        enable_determinism();
        assert!(determinism_enabled());
        let a = StoreRandomState::default().hash_one("key");
        let b = StoreRandomState::default().hash_one("key");
        assert_eq!(a, b);
    }
}
