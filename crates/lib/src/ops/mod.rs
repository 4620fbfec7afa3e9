//! Field operations and their merge algebra.
//!
//! An [`Operation`] is one local change to a single entity field that the
//! remote store has not confirmed yet. Successive changes to the same field
//! collapse into one operation through [`Operation::merge_with_previous`], and
//! [`Operation::estimate`] predicts the field value the store will hold once
//! the operation is applied.
//!
//! Operations reach the wire through [`Operation::to_wire`] and come back
//! through the [`OpRegistry`]. The pending operations of one entity live in a
//! [`PendingOps`] queue.

use serde_json::json;
use tracing::debug;

use crate::{
    Result,
    codec::encode,
    constants::{OP_ADD, OP_ADD_UNIQUE, OP_DELETE, OP_INCREMENT, OP_KEY, OP_REMOVE},
    value::{Value, number_to_json},
};

pub mod errors;
mod items;
mod queue;
mod registry;
mod relation;

pub use errors::OpError;
pub use items::ItemSet;
use items::same_item;
pub use queue::PendingOps;
pub use registry::{OpDecoder, OpRegistry};
pub use relation::RelationOp;

/// A pending change to one field.
///
/// Operations are immutable; merging builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Replace the field with a value
    Set(Value),
    /// Delete the field
    Unset,
    /// Add to a numeric field
    Increment(f64),
    /// Append items to an array field
    Add(Vec<Value>),
    /// Append items to an array field unless already present
    AddUnique(ItemSet),
    /// Remove every occurrence of the items from an array field
    Remove(ItemSet),
    /// Change the membership of a relation field
    Relation(RelationOp),
}

impl Operation {
    pub fn set(value: impl Into<Value>) -> Self {
        Operation::Set(value.into())
    }

    pub fn increment(amount: f64) -> Self {
        Operation::Increment(amount)
    }

    pub fn add(items: impl IntoIterator<Item = Value>) -> Self {
        Operation::Add(items.into_iter().collect())
    }

    pub fn add_unique(items: impl IntoIterator<Item = Value>) -> Self {
        Operation::AddUnique(ItemSet::new(items))
    }

    pub fn remove(items: impl IntoIterator<Item = Value>) -> Self {
        Operation::Remove(ItemSet::new(items))
    }

    /// A relation change; see [`RelationOp::new`].
    pub fn relation(adds: &[Value], removes: &[Value]) -> Result<Self> {
        RelationOp::new(adds, removes).map(Operation::Relation)
    }

    /// Short name of the variant, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Set(_) => "Set",
            Operation::Unset => "Unset",
            Operation::Increment(_) => "Increment",
            Operation::Add(_) => "Add",
            Operation::AddUnique(_) => "AddUnique",
            Operation::Remove(_) => "Remove",
            Operation::Relation(_) => "Relation",
        }
    }

    /// The wire form sent to the remote store.
    ///
    /// A `Set` is sent as the encoded value itself, every other variant as an
    /// `{"__op": ...}` map.
    ///
    /// # Errors
    ///
    /// Fails when a carried value cannot be encoded, for instance an unsaved
    /// entity or attachment.
    pub fn to_wire(&self) -> Result<serde_json::Value> {
        match self {
            Operation::Set(value) => encode(value, None, false),
            Operation::Unset => Ok(json!({OP_KEY: OP_DELETE})),
            Operation::Increment(amount) => {
                Ok(json!({OP_KEY: OP_INCREMENT, "amount": number_to_json(*amount)}))
            }
            Operation::Add(items) => items_wire(OP_ADD, items),
            Operation::AddUnique(items) => items_wire(OP_ADD_UNIQUE, items.as_slice()),
            Operation::Remove(items) => items_wire(OP_REMOVE, items.as_slice()),
            Operation::Relation(relation) => Ok(relation.to_wire()),
        }
    }

    /// Collapses `self`, applied after `previous`, into a single operation.
    ///
    /// The result has the same effect on any field value as applying
    /// `previous` and then `self`.
    ///
    /// # Errors
    ///
    /// - [`OpError::InvalidOperationSequence`] when `self` cannot follow `previous`
    /// - [`OpError::RelationAfterUnset`] for relation changes around a delete
    /// - [`OpError::RelationClassMismatch`] for relations of two classes
    /// - [`OpError::NonNumericIncrement`] and [`OpError::ExpectedArray`] when
    ///   `previous` set a value of the wrong kind
    pub fn merge_with_previous(&self, previous: Option<&Operation>) -> Result<Operation> {
        use Operation::*;

        let Some(previous) = previous else {
            return Ok(self.clone());
        };

        let merged = match (self, previous) {
            (Set(_), _) => self.clone(),

            (Unset, Relation(_)) => return Err(OpError::RelationAfterUnset.into()),
            (Unset, _) => Unset,

            (Increment(amount), Unset) => Set(Value::Number(*amount)),
            (Increment(amount), Increment(earlier)) => Increment(amount + earlier),
            (Increment(_), Set(value)) => Set(self.estimate_over(Some(value))?),

            (Add(items), Unset) => Set(Value::Array(items.clone())),
            (AddUnique(items), Unset) => Set(Value::Array(items.as_slice().to_vec())),
            (Remove(_), Unset) => Unset,

            (Add(_) | AddUnique(_) | Remove(_), Set(value)) => {
                Set(self.estimate_over(Some(value))?)
            }

            (Add(items), Add(earlier)) => Add(earlier.iter().chain(items).cloned().collect()),
            (AddUnique(items), AddUnique(earlier)) => {
                AddUnique(ItemSet::new(add_unique(earlier.as_slice().to_vec(), items)))
            }
            (Remove(items), Remove(earlier)) => Remove(earlier.union(items)),
            (
                Add(_) | AddUnique(_) | Remove(_),
                earlier @ (Add(_) | AddUnique(_) | Remove(_)),
            ) => {
                let base = earlier.estimate_over(None)?;
                Set(self.estimate_over(Some(&base))?)
            }

            (Relation(relation), Relation(earlier)) => Relation(relation.merge(earlier)?),
            (Relation(_), Unset) => return Err(OpError::RelationAfterUnset.into()),

            (Increment(_) | Add(_) | AddUnique(_) | Remove(_) | Relation(_), _) => {
                return Err(OpError::InvalidOperationSequence {
                    op: self.kind(),
                    previous: previous.kind(),
                }
                .into());
            }
        };

        debug!(
            op = self.kind(),
            previous = previous.kind(),
            merged = merged.kind(),
            "Merged operation with previous"
        );
        Ok(merged)
    }

    /// Predicts the field value after this operation is applied to `old`.
    ///
    /// `None` in either position means the field is absent. `key` is the field
    /// name, used to name a relation created from nothing. A `Null` old value
    /// counts as absent.
    ///
    /// # Errors
    ///
    /// - [`OpError::NonNumericIncrement`] for an increment over a non-number
    /// - [`OpError::ExpectedArray`] for an array operation over a non-array
    /// - [`OpError::RelationClassMismatch`] or
    ///   [`OpError::InvalidOperationSequence`] for a relation over an
    ///   incompatible value
    pub fn estimate(&self, old: Option<&Value>, key: &str) -> Result<Option<Value>> {
        let estimated = match self {
            Operation::Set(value) => value.clone(),
            Operation::Unset => return Ok(None),
            Operation::Increment(amount) => match old {
                None | Some(Value::Null) => Value::Number(*amount),
                Some(Value::Number(n)) => Value::Number(n + amount),
                Some(other) => {
                    return Err(OpError::NonNumericIncrement {
                        found: other.type_name(),
                    }
                    .into());
                }
            },
            Operation::Add(items) => {
                let mut base = array_base(self.kind(), old)?.unwrap_or_default();
                base.extend(items.iter().cloned());
                Value::Array(base)
            }
            Operation::AddUnique(items) => Value::Array(match array_base(self.kind(), old)? {
                Some(base) => add_unique(base, items),
                None => items.as_slice().to_vec(),
            }),
            Operation::Remove(items) => {
                let mut base = array_base(self.kind(), old)?.unwrap_or_default();
                base.retain(|item| !items.contains(item));
                Value::Array(base)
            }
            Operation::Relation(relation) => relation.estimate(old, key)?,
        };
        Ok(Some(estimated))
    }

    /// Estimate over a value set by an earlier operation on the same field.
    fn estimate_over(&self, old: Option<&Value>) -> Result<Value> {
        Ok(self.estimate(old, "")?.unwrap_or(Value::Null))
    }
}

/// The array an array operation starts from; `None` when the field is absent.
fn array_base(op: &'static str, old: Option<&Value>) -> Result<Option<Vec<Value>>> {
    match old {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items.clone())),
        Some(other) => Err(OpError::ExpectedArray {
            op,
            found: other.type_name(),
        }
        .into()),
    }
}

/// Appends each item to `base` unless the same item is already present.
///
/// A saved entity replaces the matching element in place, so the newer
/// handle wins.
fn add_unique(mut base: Vec<Value>, items: &ItemSet) -> Vec<Value> {
    for item in items {
        match base.iter().position(|existing| same_item(existing, item)) {
            Some(index) => {
                if matches!(item, Value::Entity(entity) if entity.id().is_some()) {
                    base[index] = item.clone();
                }
            }
            None => base.push(item.clone()),
        }
    }
    base
}

fn items_wire(tag: &str, items: &[Value]) -> Result<serde_json::Value> {
    let objects = items
        .iter()
        .map(|item| encode(item, None, false))
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({OP_KEY: tag, "objects": objects}))
}
