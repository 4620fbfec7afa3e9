//! The per-entity queue of unconfirmed field operations.

use indexmap::IndexMap;
use tracing::debug;

use super::Operation;
use crate::{Result, value::Value};

/// Field name to the collapsed net effect of every local change to that field
/// since its last confirmed value.
///
/// Fields keep the order in which they were first changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingOps {
    ops: IndexMap<String, Operation>,
}

impl PendingOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges `op` into the entry for `key` and returns the merged operation.
    ///
    /// On error the queue is left unchanged.
    pub fn apply(&mut self, key: &str, op: Operation) -> Result<&Operation> {
        let merged = op.merge_with_previous(self.ops.get(key))?;
        debug!(key = %key, op = merged.kind(), "Queued operation");
        let index = self.ops.insert_full(key.to_string(), merged).0;
        Ok(&self.ops[index])
    }

    /// Replaces the entry for `key` without merging.
    pub fn insert(&mut self, key: impl Into<String>, op: Operation) -> Option<Operation> {
        self.ops.insert(key.into(), op)
    }

    pub fn get(&self, key: &str) -> Option<&Operation> {
        self.ops.get(key)
    }

    /// Drops the entry for `key`, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Operation> {
        self.ops.shift_remove(key)
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.ops.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation)> {
        self.ops.iter().map(|(key, op)| (key.as_str(), op))
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// The value of `key` once its pending operation lands on `confirmed`.
    ///
    /// Without a pending operation this is `confirmed` itself.
    pub fn estimate(&self, key: &str, confirmed: Option<&Value>) -> Result<Option<Value>> {
        match self.ops.get(key) {
            Some(op) => op.estimate(confirmed, key),
            None => Ok(confirmed.cloned()),
        }
    }

    /// Encodes every entry for a flush, in queue order.
    pub fn to_wire(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.ops
            .iter()
            .map(|(key, op)| Ok((key.clone(), op.to_wire()?)))
            .collect()
    }
}
