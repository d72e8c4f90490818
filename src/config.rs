// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! Construction options for a [`KeyValueStore`](crate::KeyValueStore).

/// Decides when [`rollback`](crate::KeyValueStore::rollback) considers a transaction to be open.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RollbackGuard {
    /// Any open block may be rolled back, including one that recorded no mutations.
    #[default]
    TopmostBlock,

    /// Rollback fails with [`Error::NoTransaction`](crate::Error::NoTransaction) while the
    /// outermost block is empty, even if a nested block has recorded mutations.
    ///
    /// This matches how earlier versions of the shell behaved.
    OutermostNonEmpty,
}

/// Options used when creating a [`KeyValueStore`](crate::KeyValueStore).
///
/// ```
/// use thumbbase::{Config, KeyValueStore, RollbackGuard};
///
/// let config = Config::default()
///     .with_capacity(1024)
///     .with_rollback_guard(RollbackGuard::OutermostNonEmpty);
/// let store = KeyValueStore::<String>::with_config(config);
/// assert_eq!(store.config().rollback_guard, RollbackGuard::OutermostNonEmpty);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Number of keys to reserve room for up front.
    pub capacity: usize,
    pub rollback_guard: RollbackGuard,
}

impl Config {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_rollback_guard(mut self, rollback_guard: RollbackGuard) -> Self {
        self.rollback_guard = rollback_guard;
        self
    }
}
