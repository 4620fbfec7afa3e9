//! Membership changes to a relation field.

use indexmap::IndexSet;
use serde_json::json;

use super::OpError;
use crate::{
    Result,
    constants::{
        CLASS_NAME_KEY, OBJECT_ID_KEY, OP_ADD_RELATION, OP_BATCH, OP_KEY, OP_REMOVE_RELATION,
        TYPE_KEY, TYPE_POINTER,
    },
    entity::Entity,
    value::{RelationRef, Value},
};

/// Ids added to and removed from a relation, all of one target class.
///
/// Only ids are kept. [`RelationOp::added`] and [`RelationOp::removed`]
/// rebuild unfetched pointer entities on demand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationOp {
    target_class: Option<String>,
    adds: IndexSet<String>,
    removes: IndexSet<String>,
}

impl RelationOp {
    /// Builds a relation change from entity values or raw id strings.
    ///
    /// # Errors
    ///
    /// - [`OpError::UnsavedRelationTarget`] for an entity without an id
    /// - [`OpError::RelationClassMismatch`] when entities of two classes are mixed
    /// - [`OpError::MalformedOperation`] for values that are neither entities nor ids
    pub fn new(adds: &[Value], removes: &[Value]) -> Result<Self> {
        let mut op = Self::default();
        for value in adds {
            let id = op.target_id(value)?;
            op.adds.insert(id);
        }
        for value in removes {
            let id = op.target_id(value)?;
            op.removes.insert(id);
        }
        Ok(op)
    }

    /// Builds a relation change from ids of a known class.
    pub fn from_ids<A, R>(target_class: Option<String>, adds: A, removes: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            target_class,
            adds: adds.into_iter().map(Into::into).collect(),
            removes: removes.into_iter().map(Into::into).collect(),
        }
    }

    fn target_id(&mut self, value: &Value) -> Result<String> {
        match value {
            Value::Entity(entity) => {
                let class_name = entity.class_name();
                let id = entity
                    .id()
                    .ok_or_else(|| OpError::UnsavedRelationTarget {
                        class_name: class_name.clone(),
                    })?;
                match &self.target_class {
                    Some(expected) if *expected != class_name => {
                        Err(OpError::RelationClassMismatch {
                            expected: expected.clone(),
                            actual: class_name,
                        }
                        .into())
                    }
                    Some(_) => Ok(id),
                    None => {
                        self.target_class = Some(class_name);
                        Ok(id)
                    }
                }
            }
            Value::String(id) => Ok(id.clone()),
            other => Err(OpError::MalformedOperation {
                tag: "Relation".to_string(),
                reason: format!("expected an entity or object id, found {}", other.type_name()),
            }
            .into()),
        }
    }

    pub fn target_class(&self) -> Option<&str> {
        self.target_class.as_deref()
    }

    /// Ids added to the relation.
    pub fn adds(&self) -> &IndexSet<String> {
        &self.adds
    }

    /// Ids removed from the relation.
    pub fn removes(&self) -> &IndexSet<String> {
        &self.removes
    }

    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }

    /// Unfetched entities being added.
    pub fn added(&self) -> Vec<Entity> {
        self.stubs(&self.adds)
    }

    /// Unfetched entities being removed.
    pub fn removed(&self) -> Vec<Entity> {
        self.stubs(&self.removes)
    }

    fn stubs(&self, ids: &IndexSet<String>) -> Vec<Entity> {
        let class_name = self.target_class.clone().unwrap_or_default();
        ids.iter()
            .map(|id| Entity::pointer(class_name.clone(), id.clone()))
            .collect()
    }

    /// Combines `self` applied after `previous`.
    ///
    /// An id added by one side and removed by the other ends up wherever the
    /// later operation put it.
    pub(crate) fn merge(&self, previous: &RelationOp) -> Result<RelationOp> {
        if let (Some(expected), Some(actual)) = (&previous.target_class, &self.target_class) {
            if expected != actual {
                return Err(OpError::RelationClassMismatch {
                    expected: expected.clone(),
                    actual: actual.clone(),
                }
                .into());
            }
        }

        let adds = previous
            .adds
            .difference(&self.removes)
            .chain(self.adds.iter())
            .cloned()
            .collect();
        let removes = previous
            .removes
            .difference(&self.adds)
            .chain(self.removes.iter())
            .cloned()
            .collect();

        Ok(RelationOp {
            target_class: self
                .target_class
                .clone()
                .or_else(|| previous.target_class.clone()),
            adds,
            removes,
        })
    }

    /// The relation value after this change, for the field `key`.
    pub(crate) fn estimate(&self, old: Option<&Value>, key: &str) -> Result<Value> {
        match old {
            None | Some(Value::Null) => Ok(Value::Relation(RelationRef {
                target_class: self.target_class.clone(),
                key: Some(key.to_string()),
                pending_adds: self.adds.clone(),
                pending_removes: self.removes.clone(),
            })),
            Some(Value::Relation(relation)) => {
                let mut relation = relation.clone();
                if let Some(class_name) = &self.target_class {
                    match &relation.target_class {
                        Some(existing) if existing != class_name => {
                            return Err(OpError::RelationClassMismatch {
                                expected: existing.clone(),
                                actual: class_name.clone(),
                            }
                            .into());
                        }
                        Some(_) => {}
                        None => relation.target_class = Some(class_name.clone()),
                    }
                }
                Ok(Value::Relation(relation))
            }
            Some(other) => Err(OpError::InvalidOperationSequence {
                op: "Relation",
                previous: other.type_name(),
            }
            .into()),
        }
    }

    /// `AddRelation`, `RemoveRelation`, a `Batch` of both, or `{}` when empty.
    pub(crate) fn to_wire(&self) -> serde_json::Value {
        let pointers = |ids: &IndexSet<String>| -> Vec<serde_json::Value> {
            ids.iter()
                .map(|id| {
                    json!({
                        TYPE_KEY: TYPE_POINTER,
                        CLASS_NAME_KEY: self.target_class,
                        OBJECT_ID_KEY: id,
                    })
                })
                .collect()
        };

        let adds = (!self.adds.is_empty())
            .then(|| json!({OP_KEY: OP_ADD_RELATION, "objects": pointers(&self.adds)}));
        let removes = (!self.removes.is_empty())
            .then(|| json!({OP_KEY: OP_REMOVE_RELATION, "objects": pointers(&self.removes)}));

        match (adds, removes) {
            (Some(adds), Some(removes)) => json!({OP_KEY: OP_BATCH, "ops": [adds, removes]}),
            (Some(single), None) | (None, Some(single)) => single,
            (None, None) => json!({}),
        }
    }
}
