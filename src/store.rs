// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use crate::{
    Config, Error, Storage, Value,
    transaction::{JournalEntry, TransactionStack},
};
use std::{borrow::Borrow, fmt, hash::Hash};

/// An in-memory key-value store with reverse value counts and nested transactions.
///
/// `KeyValueStore` composes a [`Storage`] (the mapping and its value-count index) with a
/// [`TransactionStack`]. Mutations go to the storage and, while a transaction is open, are
/// journaled on the stack; rollback hands the storage back to the stack so it can replay the
/// inverse operations.
///
/// # Example
///
/// ```
/// use thumbbase::{Error, KeyValueStore, Value};
///
/// let mut store = KeyValueStore::<String>::new();
/// store.set("a", 10)?;
/// store.set("b", 10)?;
/// assert_eq!(store.num_equal_to(&Value::from(10)), 2);
///
/// store.begin();
/// store.unset("a")?;
/// store.commit();
/// assert_eq!(store.get("a"), None);
/// assert_eq!(store.rollback(), Err(Error::NoTransaction));
/// # Ok::<(), Error>(())
/// ```
pub struct KeyValueStore<K = String> {
    storage: Storage<K>,
    transactions: TransactionStack<K>,
    config: Config,
}

impl<K> Default for KeyValueStore<K> {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl<K: fmt::Debug> fmt::Debug for KeyValueStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("storage", &self.storage)
            .field("transactions", &self.transactions)
            .finish()
    }
}

impl<K> KeyValueStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            storage: Storage::with_capacity(config.capacity),
            transactions: TransactionStack::new(config.rollback_guard),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read access to the underlying mapping and its index.
    pub fn storage(&self) -> &Storage<K> {
        &self.storage
    }

    pub fn transactions(&self) -> &TransactionStack<K> {
        &self.transactions
    }

    /// Number of keys currently holding a value.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Opens a (possibly nested) transaction.
    pub fn begin(&mut self) {
        self.transactions.begin();
    }

    /// Closes every open transaction, keeping all of their changes.
    pub fn commit(&mut self) {
        self.transactions.commit();
    }

    /// Returns true while a transaction is open.
    pub fn is_writing_transactions(&self) -> bool {
        self.transactions.is_writing_transactions()
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.transactions.depth()
    }

    pub fn is_rolling(&self) -> bool {
        self.transactions.is_rolling()
    }
}

impl<K> KeyValueStore<K>
where
    K: Hash + Eq + Clone + fmt::Debug,
{
    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Fails only with [`Error::UnknownValue`] if the value index has been corrupted.
    pub fn set(&mut self, key: impl Into<K>, value: impl Into<Value>) -> Result<(), Error> {
        let key = key.into();
        let value = value.into();
        if self.transactions.is_journaling() {
            let previous = self.storage.set(key.clone(), value.clone())?;
            self.transactions.add(JournalEntry::set(key, value, previous));
        } else {
            self.storage.set(key, value)?;
        }
        Ok(())
    }

    /// Returns the value under `key`, or `None` if it was never set or has been unset.
    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.storage.get(key)
    }

    /// Removes the value under `key`. Unsetting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Fails only with [`Error::UnknownValue`] if the value index has been corrupted.
    pub fn unset<Q>(&mut self, key: &Q) -> Result<(), Error>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ToOwned<Owned = K> + ?Sized,
    {
        let previous = self.storage.unset(key)?;
        if self.transactions.is_journaling() {
            self.transactions.add(JournalEntry::unset(key.to_owned(), previous));
        }
        Ok(())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.storage.contains_key(key)
    }

    /// Number of keys currently holding `value`.
    pub fn num_equal_to(&self, value: &Value) -> usize {
        self.storage.num_equal_to(value)
    }

    /// Undoes every mutation made since the innermost open `begin` and closes that transaction.
    ///
    /// # Errors
    ///
    /// [`Error::NoTransaction`] if no transaction is open (see
    /// [`RollbackGuard`](crate::RollbackGuard) for when an empty outer transaction counts as
    /// open).
    pub fn rollback(&mut self) -> Result<(), Error> {
        self.transactions.rollback(&mut self.storage)
    }
}
