// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Error type shared by the store, its index, and the command layer.

/// Errors produced by [`KeyValueStore`](crate::KeyValueStore) operations and the
/// [`command`](crate::command) layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required key or value was missing.
    #[error("{0}")]
    InvalidArgument(String),

    /// A value that was never registered in the index was decremented.
    ///
    /// The store only ever decrements values it has previously counted, so seeing this means
    /// the index and the storage map have drifted apart.
    #[error("that value is not currently stored")]
    UnknownValue,

    /// `rollback` was called without an open transaction.
    #[error("NO TRANSACTION")]
    NoTransaction,

    /// `rollback` was called while another rollback was still replaying.
    #[error("a rollback is already in progress")]
    RollbackInProgress,

    /// The command layer did not recognize the command name.
    #[error("{} is not a valid command", .0.to_uppercase())]
    UnknownCommand(String),
}

/// Shorthand for results whose error is [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
