// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use super::Mutate;
use crate::{Error, Value};

/// The kind of mutation a [`JournalEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Set,
    Unset,
}

/// Everything needed to undo one mutation by issuing its inverse through [`Mutate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry<K> {
    pub op: Op,
    pub key: K,
    /// The value written by a set; always `None` for an unset.
    pub new_value: Option<Value>,
    /// What `key` held before the mutation, `None` if it was absent.
    pub previous_value: Option<Value>,
}

impl<K> JournalEntry<K> {
    pub fn set(key: K, value: Value, previous_value: Option<Value>) -> Self {
        Self {
            op: Op::Set,
            key,
            new_value: Some(value),
            previous_value,
        }
    }

    pub fn unset(key: K, previous_value: Option<Value>) -> Self {
        Self {
            op: Op::Unset,
            key,
            new_value: None,
            previous_value,
        }
    }

    /// Reverts this mutation on `target`.
    ///
    /// Undoing a set goes through an explicit unset before restoring the previous value, so the
    /// count for the value being undone is released before the previous one is counted again.
    pub(crate) fn undo<M>(self, target: &mut M) -> Result<(), Error>
    where
        M: Mutate<K> + ?Sized,
    {
        match (self.op, self.previous_value) {
            (_, None) => target.unset(&self.key).map(drop),
            (Op::Unset, Some(previous)) => target.set(self.key, previous).map(drop),
            (Op::Set, Some(previous)) => {
                target.unset(&self.key)?;
                target.set(self.key, previous).map(drop)
            }
        }
    }
}
