// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Nested transactions with replay-based rollback.
//!
//! Every mutation made while a transaction is open is recorded as a [`JournalEntry`] in the
//! innermost [`TransactionBlock`]. Rolling back pops that block and undoes its entries newest
//! first by issuing the inverse `set`/`unset` calls through [`Mutate`], the same operations that
//! made the changes in the first place. Because the undo goes through the regular mutation path,
//! secondary bookkeeping such as the [`ValueCountIndex`](crate::ValueCountIndex) stays correct
//! without any snapshotting.
//!
//! # Example
//!
//! ```
//! use thumbbase::{KeyValueStore, Value};
//!
//! let mut store = KeyValueStore::<String>::new();
//! store.set("a", 30)?;
//!
//! store.begin();
//! store.set("a", 40)?;
//! store.begin();
//! store.unset("a")?;
//! assert_eq!(store.get("a"), None);
//!
//! // undoes the unset only
//! store.rollback()?;
//! assert_eq!(store.get("a"), Some(&Value::from(40)));
//!
//! // undoes the set to 40
//! store.rollback()?;
//! assert_eq!(store.get("a"), Some(&Value::from(30)));
//! assert_eq!(store.num_equal_to(&Value::from(40)), 0);
//! # Ok::<(), thumbbase::Error>(())
//! ```
//!
//! # Commit Semantics
//!
//! [`TransactionStack::commit`] always closes *every* open block. There is no partial commit of
//! the innermost block only; after a commit, rollback fails with
//! [`Error::NoTransaction`](crate::Error::NoTransaction).

use crate::{Error, Value};

mod entry;
#[cfg(test)]
pub(crate) mod recording_target;
mod stack;

pub use entry::{JournalEntry, Op};
pub use stack::{TransactionBlock, TransactionStack};

/// The mutation operations a rollback replays its journal through.
///
/// Implementors must keep any derived state (such as a value-count index) consistent, exactly as
/// they would for a mutation made by a caller.
pub trait Mutate<K> {
    /// Stores `value` under `key`, returning what `key` held before.
    fn set(&mut self, key: K, value: Value) -> Result<Option<Value>, Error>;

    /// Removes the value under `key`, returning what it held before.
    fn unset(&mut self, key: &K) -> Result<Option<Value>, Error>;
}
