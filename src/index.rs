// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Reverse lookup from a value to the number of keys holding it.

use crate::{Error, StoreRandomState, Value, create_map};
use std::{collections::HashMap, fmt, hash::Hash};

/// Counts how many keys currently hold each distinct value.
///
/// A value becomes *registered* the first time it is counted and stays registered even once its
/// count drops back to zero. [`ValueCountIndex::get`] keeps the two states apart: `None` means
/// the value was never seen, `Some(0)` means it was seen but no key holds it anymore.
#[derive(Clone)]
pub struct ValueCountIndex<V = Value> {
    counts: HashMap<V, usize, StoreRandomState>,
}

impl<V> Default for ValueCountIndex<V> {
    fn default() -> Self {
        Self {
            counts: create_map(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for ValueCountIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts.iter()).finish()
    }
}

impl<V> ValueCountIndex<V>
where
    V: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `value` has ever been registered, whatever its current count.
    pub fn contains(&self, value: &V) -> bool {
        self.counts.contains_key(value)
    }

    /// Registers `value` at zero if unseen, then adds one. Returns the new count.
    pub fn increment(&mut self, value: &V) -> usize {
        if let Some(count) = self.counts.get_mut(value) {
            *count += 1;
            return *count;
        }
        self.counts.insert(value.clone(), 1);
        1
    }

    /// Removes one from the count of `value`, never going below zero. Returns the new count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownValue`] if `value` was never registered.
    pub fn decrement(&mut self, value: &V) -> Result<usize, Error> {
        let count = self.counts.get_mut(value).ok_or(Error::UnknownValue)?;
        *count = count.saturating_sub(1);
        Ok(*count)
    }

    /// Returns the count of `value`, or `None` if it was never registered.
    pub fn get(&self, value: &V) -> Option<usize> {
        self.counts.get(value).copied()
    }

    /// Overwrites the count of `value`, registering it if needed.
    ///
    /// This bypasses the bookkeeping done by the store and can break the index invariant. It is
    /// not reachable from the command surface.
    pub fn set(&mut self, value: V, count: usize) -> usize {
        self.counts.insert(value, count);
        count
    }

    /// Number of registered values, including those at zero.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
