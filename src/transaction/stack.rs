// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::{JournalEntry, Mutate};
use crate::{Error, RollbackGuard};
use smallvec::SmallVec;
use std::fmt;
use tracing::{debug, trace, warn};

/// The journal entries recorded between one `begin` and the matching `rollback` or `commit`.
///
/// Entries keep insertion order and are undone last-in-first-out.
#[derive(Clone, PartialEq, Eq)]
pub struct TransactionBlock<K> {
    // most blocks in interactive use hold a handful of mutations
    entries: SmallVec<[JournalEntry<K>; 4]>,
}

impl<K> Default for TransactionBlock<K> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for TransactionBlock<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<K> TransactionBlock<K> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in the order they were recorded.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &JournalEntry<K>> + ExactSizeIterator {
        self.entries.iter()
    }

    fn push(&mut self, entry: JournalEntry<K>) {
        self.entries.push(entry);
    }
}

/// A stack of nested transaction blocks.
///
/// The stack is either idle (no block open, nothing journaled) or active with a nesting depth of
/// at least one:
///
/// ```text
/// Idle ──begin──▶ Active(1) ──begin──▶ Active(2) ...
///   ▲                │  ▲                  │
///   └────rollback────┘  └─────rollback─────┘
///   ▲
///   └──commit── Active(n)
/// ```
///
/// The stack does not hold the data it protects. [`TransactionStack::rollback`] is handed the
/// [`Mutate`] target to replay inverse operations on.
pub struct TransactionStack<K> {
    blocks: Vec<TransactionBlock<K>>,
    writable: bool,
    rolling: bool,
    guard: RollbackGuard,
}

impl<K> Default for TransactionStack<K> {
    fn default() -> Self {
        Self::new(RollbackGuard::default())
    }
}

impl<K: fmt::Debug> fmt::Debug for TransactionStack<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionStack")
            .field("blocks", &self.blocks)
            .field("writable", &self.writable)
            .field("rolling", &self.rolling)
            .finish()
    }
}

impl<K> TransactionStack<K> {
    pub fn new(guard: RollbackGuard) -> Self {
        Self {
            blocks: Vec::new(),
            writable: false,
            rolling: false,
            guard,
        }
    }

    /// Opens a new, innermost transaction block.
    pub fn begin(&mut self) {
        self.writable = true;
        self.blocks.push(TransactionBlock::default());
        debug!(depth = self.blocks.len(), "began transaction");
    }

    /// Makes every mutation since the outermost `begin` permanent.
    ///
    /// All nested blocks are discarded together; there is no way to commit only the innermost
    /// one. Committing with no open transaction is a no-op.
    pub fn commit(&mut self) {
        let depth = self.blocks.len();
        self.blocks.clear();
        self.writable = false;
        debug!(depth, "committed transactions");
    }

    /// Undoes the mutations recorded in the innermost block and closes it.
    ///
    /// Entries are replayed newest-first through `target`, which must be the same store the
    /// entries were recorded from. Outer blocks are left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::NoTransaction`] if no block is open, or, under
    ///   [`RollbackGuard::OutermostNonEmpty`], if the outermost block recorded nothing.
    /// - [`Error::RollbackInProgress`] if called while a rollback is replaying.
    /// - Any error `target` reports while replaying. The block is gone at that point and
    ///   the rolling flag is cleared, so the stack stays usable.
    pub fn rollback<M>(&mut self, target: &mut M) -> Result<(), Error>
    where
        M: Mutate<K> + ?Sized,
    {
        if self.rolling {
            warn!("refusing to start a rollback while another is in progress");
            return Err(Error::RollbackInProgress);
        }
        if !self.writable {
            return Err(Error::NoTransaction);
        }
        let outermost_empty = self.blocks.first().is_none_or(TransactionBlock::is_empty);
        if self.guard == RollbackGuard::OutermostNonEmpty && outermost_empty {
            return Err(Error::NoTransaction);
        }
        let Some(block) = self.blocks.pop() else {
            return Err(Error::NoTransaction);
        };

        self.rolling = true;
        let undone = block.len();
        let result = block
            .entries
            .into_iter()
            .rev()
            .try_for_each(|entry| entry.undo(&mut *target));
        self.rolling = false;

        if self.blocks.is_empty() {
            self.writable = false;
        }
        match &result {
            Ok(()) => debug!(undone, depth = self.blocks.len(), "rolled back transaction"),
            Err(error) => warn!(%error, depth = self.blocks.len(), "rollback replay failed"),
        }
        result
    }

    /// Records `entry` in the innermost block.
    ///
    /// Nothing is recorded unless a transaction is open and no rollback is replaying. Returns
    /// whether the entry was recorded.
    pub fn add(&mut self, entry: JournalEntry<K>) -> bool
    where
        K: fmt::Debug,
    {
        if !self.is_journaling() {
            return false;
        }
        trace!(?entry, "journaled");
        if self.blocks.is_empty() {
            self.blocks.push(TransactionBlock::default());
        }
        let depth = self.blocks.len();
        self.blocks[depth - 1].push(entry);
        true
    }

    /// Returns true while a transaction is open.
    pub fn is_writing_transactions(&self) -> bool {
        self.writable
    }

    /// Returns true while a rollback is replaying its block.
    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// Returns true if a mutation made now would be recorded by [`TransactionStack::add`].
    pub fn is_journaling(&self) -> bool {
        self.writable && !self.rolling
    }

    /// Number of open transaction blocks.
    pub fn depth(&self) -> usize {
        self.blocks.len()
    }

    /// The innermost open block, if any.
    pub fn top(&self) -> Option<&TransactionBlock<K>> {
        self.blocks.last()
    }

    pub fn guard(&self) -> RollbackGuard {
        self.guard
    }
}
