// (c) Copyright 2025 Helsing GmbH. All rights reserved.
//! This module contains an implementation of Mutate that simply records
//! all calls in a human readable form. This is mostly useful for tests.

use super::Mutate;
use crate::{Error, Value};
use std::fmt::Debug;

/// A replay target that records all calls and holds no data.
#[derive(Debug, Default)]
pub struct RecordingTarget {
    /// A string-representation of each call that the target has received.
    pub calls_seen: Vec<String>,
}

impl<K: Debug> Mutate<K> for RecordingTarget {
    fn set(&mut self, key: K, value: Value) -> Result<Option<Value>, Error> {
        self.calls_seen.push(format!("set {key:?} {value:?}"));
        Ok(None)
    }

    fn unset(&mut self, key: &K) -> Result<Option<Value>, Error> {
        self.calls_seen.push(format!("unset {key:?}"));
        Ok(None)
    }
}
