// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{
    Error, StoreRandomState, Value, ValueCountIndex, create_map_with_capacity,
    transaction::Mutate,
};
use std::{borrow::Borrow, collections::HashMap, fmt, hash::Hash};
use tracing::trace;

/// The key→value mapping together with its [`ValueCountIndex`].
///
/// Every mutation updates the index before it touches the mapping, so the count for any value
/// always equals the number of keys holding it. `Storage` knows nothing about transactions; it
/// is the target that [`TransactionStack::rollback`](crate::transaction::TransactionStack::rollback)
/// replays onto.
#[derive(Clone)]
pub struct Storage<K> {
    entries: HashMap<K, Value, StoreRandomState>,
    index: ValueCountIndex,
}

impl<K> Default for Storage<K> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: fmt::Debug> fmt::Debug for Storage<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K> Storage<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: create_map_with_capacity(capacity),
            index: ValueCountIndex::default(),
        }
    }

    pub fn index(&self) -> &ValueCountIndex {
        &self.index
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> Storage<K>
where
    K: Hash + Eq + fmt::Debug,
{
    /// Stores `value` under `key` and returns the value it replaced.
    pub fn set(&mut self, key: K, value: Value) -> Result<Option<Value>, Error> {
        if let Some(previous) = self.entries.get(&key) {
            if self.index.contains(previous) {
                self.index.decrement(previous)?;
            }
        }
        let count = self.index.increment(&value);
        trace!(?key, ?value, count, "set");
        Ok(self.entries.insert(key, value))
    }

    /// Returns the value under `key`, or `None` if it was never set or has been unset.
    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Removes the value under `key` and returns it.
    ///
    /// Unsetting a key that holds nothing is not an error.
    pub fn unset<Q>(&mut self, key: &Q) -> Result<Option<Value>, Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        if let Some(previous) = self.entries.get(key) {
            if self.index.contains(previous) {
                self.index.decrement(previous)?;
            }
        }
        trace!(?key, "unset");
        Ok(self.entries.remove(key))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Number of keys currently holding `value`. Values never stored count as zero.
    pub fn num_equal_to(&self, value: &Value) -> usize {
        self.index.get(value).unwrap_or(0)
    }

    /// Iterates over all keys holding a value, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Value)> {
        self.entries.iter()
    }
}

impl<K> Mutate<K> for Storage<K>
where
    K: Hash + Eq + fmt::Debug,
{
    fn set(&mut self, key: K, value: Value) -> Result<Option<Value>, Error> {
        Storage::set(self, key, value)
    }

    fn unset(&mut self, key: &K) -> Result<Option<Value>, Error> {
        Storage::unset(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let mut storage = Storage::default();
        assert_eq!(storage.set("a", Value::from(10)), Ok(None));
        assert_eq!(storage.get("a"), Some(&Value::from(10)));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn overwrite_moves_count() {
        let mut storage = Storage::default();
        storage.set("a", Value::from(10)).unwrap();
        assert_eq!(
            storage.set("a", Value::from(20)),
            Ok(Some(Value::from(10)))
        );
        assert_eq!(storage.num_equal_to(&Value::from(10)), 0);
        assert_eq!(storage.num_equal_to(&Value::from(20)), 1);
        // 10 stays registered at zero
        assert_eq!(storage.index().get(&Value::from(10)), Some(0));
    }

    #[test]
    fn overwrite_with_same_value_keeps_count() {
        let mut storage = Storage::default();
        storage.set("a", Value::from(10)).unwrap();
        storage.set("a", Value::from(10)).unwrap();
        assert_eq!(storage.num_equal_to(&Value::from(10)), 1);
    }

    #[test]
    fn unset_removes_and_uncounts() {
        let mut storage = Storage::default();
        storage.set("a", Value::from(0)).unwrap();
        storage.set("b", Value::from(0)).unwrap();
        assert_eq!(storage.unset("a"), Ok(Some(Value::from(0))));
        assert_eq!(storage.get("a"), None);
        assert!(!storage.contains_key("a"));
        assert_eq!(storage.num_equal_to(&Value::from(0)), 1);
    }

    #[test]
    fn unset_missing_key_is_noop() {
        let mut storage = Storage::<&str>::default();
        assert_eq!(storage.unset("nope"), Ok(None));
        assert!(storage.is_empty());
        assert!(storage.index().is_empty());
    }

    #[test]
    fn unknown_value_counts_as_zero() {
        let storage = Storage::<&str>::default();
        assert_eq!(storage.num_equal_to(&Value::from("ghost")), 0);
    }

    #[test]
    fn string_keys_borrow_as_str() {
        let mut storage = Storage::<String>::default();
        storage.set("k".to_string(), Value::from("")).unwrap();
        assert_eq!(storage.get("k"), Some(&Value::from("")));
        assert_eq!(storage.unset("k"), Ok(Some(Value::from(""))));
        assert_eq!(storage.iter().count(), 0);
    }
}
