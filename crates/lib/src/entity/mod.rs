//! Shared entity handles.
//!
//! An [`Entity`] is a record of some class stored by the remote store. Each
//! handle is a cheap clone of the same shared state, so entities can reference
//! each other (and themselves) through [`Value::Entity`] fields and form
//! arbitrary graphs.
//!
//! An entity keeps three views of its fields:
//!
//! - the *confirmed* data last reported by the store,
//! - a [`PendingOps`] queue of local changes not confirmed yet,
//! - the *estimated* attributes: every pending operation applied to the
//!   confirmed data. This is what [`Entity::get`] returns.
//!
//! Two locks guard an entity. The writer lock serialises every change for the
//! whole read, merge and write-back, so concurrent mutations of one entity
//! apply one after the other. The state lock is only held to copy fields in
//! or out; it is never held while values are compared, encoded or estimated,
//! because those may lock other entities or this one again through a cycle.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tracing::debug;

use crate::{
    Result,
    codec::{CodecError, decode, encode, parse_date},
    constants::{
        CLASS_NAME_KEY, CREATED_AT_KEY, OBJECT_ID_KEY, TYPE_KEY, TYPE_OBJECT, UPDATED_AT_KEY,
    },
    ops::{Operation, PendingOps, RelationOp},
    value::{Pointer, RelationRef, Value, ValueMap},
};

pub mod errors;

pub use errors::EntityError;

/// Stable identity of an entity handle, shared by all its clones.
///
/// Only meaningful while some handle to the entity is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(usize);

#[derive(Debug)]
struct EntityState {
    class_name: String,
    id: Option<String>,
    confirmed: ValueMap,
    pending: PendingOps,
    attributes: ValueMap,
    has_fetched_data: bool,
}

struct EntityInner {
    writer: Mutex<()>,
    state: Mutex<EntityState>,
}

/// A shared handle to one entity.
///
/// # Equality
///
/// Two handles are equal when they share state, or when both entities are
/// saved with the same class and id. Unsaved entities are only equal to
/// handles of themselves.
#[derive(Clone)]
pub struct Entity {
    inner: Arc<EntityInner>,
}

impl Entity {
    /// A new, unsaved entity of `class_name` with no fields.
    ///
    /// The entity owns its (empty) data, so it counts as fetched.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self::from_state(class_name.into(), None, ValueMap::new(), true)
    }

    /// An unfetched stub referring to a saved entity.
    pub fn pointer(class_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self::from_state(class_name.into(), Some(id.into()), ValueMap::new(), false)
    }

    /// A fetched entity built from the fields of a wire object.
    ///
    /// `objectId` becomes the id, `createdAt`/`updatedAt` strings become
    /// dates and every other field is decoded.
    pub fn from_server_data(class_name: impl Into<String>, data: ValueMap) -> Self {
        let (id, confirmed) = decode_server_fields(data);
        Self::from_state(class_name.into(), id, confirmed, true)
    }

    fn from_state(
        class_name: String,
        id: Option<String>,
        confirmed: ValueMap,
        has_fetched_data: bool,
    ) -> Self {
        Self {
            inner: Arc::new(EntityInner {
                writer: Mutex::new(()),
                state: Mutex::new(EntityState {
                    class_name,
                    id,
                    attributes: confirmed.clone(),
                    confirmed,
                    pending: PendingOps::new(),
                    has_fetched_data,
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, EntityState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Held for the duration of one change to the entity.
    fn writer(&self) -> MutexGuard<'_, ()> {
        self.inner.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn key(&self) -> EntityKey {
        EntityKey(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Whether both handles share the same state.
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn class_name(&self) -> String {
        self.state().class_name.clone()
    }

    pub fn id(&self) -> Option<String> {
        self.state().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.state().id = Some(id.into());
    }

    /// True while there are local changes the store has not confirmed.
    pub fn is_dirty(&self) -> bool {
        !self.state().pending.is_empty()
    }

    /// True once the entity's field data is known locally.
    pub fn has_fetched_data(&self) -> bool {
        self.state().has_fetched_data
    }

    /// The estimated value of a field.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.state().attributes.get(key).cloned()
    }

    /// All estimated fields.
    pub fn attributes(&self) -> ValueMap {
        self.state().attributes.clone()
    }

    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.get(CREATED_AT_KEY).as_ref().and_then(Value::as_date)
    }

    pub fn updated_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.get(UPDATED_AT_KEY).as_ref().and_then(Value::as_date)
    }

    /// A copy of the pending operations.
    pub fn pending(&self) -> PendingOps {
        self.state().pending.clone()
    }

    /// Queues `op` for `key` and refreshes the estimate of that field.
    ///
    /// # Errors
    ///
    /// Fails when `op` cannot follow the pending operation for `key`, or
    /// cannot be estimated over its confirmed value. The entity is unchanged
    /// on error.
    pub fn apply(&self, key: &str, op: Operation) -> Result<()> {
        let _writer = self.writer();
        let (previous, confirmed) = {
            let state = self.state();
            (
                state.pending.get(key).cloned(),
                state.confirmed.get(key).cloned(),
            )
        };

        let merged = op.merge_with_previous(previous.as_ref())?;
        let estimated = merged.estimate(confirmed.as_ref(), key)?;

        debug!(key = %key, op = merged.kind(), "Queued operation on entity");
        let mut state = self.state();
        state.pending.insert(key, merged);
        match estimated {
            Some(value) => {
                state.attributes.insert(key.to_string(), value);
            }
            None => {
                state.attributes.shift_remove(key);
            }
        }
        Ok(())
    }

    /// Sets a field. An operation value is applied instead of stored.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        match value.into() {
            Value::Op(op) => self.apply(key, *op),
            value => self.apply(key, Operation::Set(value)),
        }
    }

    pub fn unset(&self, key: &str) -> Result<()> {
        self.apply(key, Operation::Unset)
    }

    pub fn increment(&self, key: &str, amount: f64) -> Result<()> {
        self.apply(key, Operation::Increment(amount))
    }

    pub fn add(&self, key: &str, items: impl IntoIterator<Item = Value>) -> Result<()> {
        self.apply(key, Operation::add(items))
    }

    pub fn add_unique(&self, key: &str, items: impl IntoIterator<Item = Value>) -> Result<()> {
        self.apply(key, Operation::add_unique(items))
    }

    pub fn remove(&self, key: &str, items: impl IntoIterator<Item = Value>) -> Result<()> {
        self.apply(key, Operation::remove(items))
    }

    /// Adds saved entities (or raw ids) to the relation in `key`.
    pub fn add_relation(&self, key: &str, targets: &[Value]) -> Result<()> {
        self.apply(key, Operation::Relation(RelationOp::new(targets, &[])?))
    }

    /// Removes saved entities (or raw ids) from the relation in `key`.
    pub fn remove_relation(&self, key: &str, targets: &[Value]) -> Result<()> {
        self.apply(key, Operation::Relation(RelationOp::new(&[], targets)?))
    }

    /// The relation stored in `key`, or a fresh empty one.
    ///
    /// # Errors
    ///
    /// Returns [`EntityError::NotARelation`] when the field holds another kind
    /// of value.
    pub fn relation(&self, key: &str) -> Result<RelationRef> {
        match self.get(key) {
            Some(Value::Relation(relation)) => Ok(relation),
            None | Some(Value::Null) => Ok(RelationRef::new(Some(key.to_string()), None)),
            Some(other) => Err(EntityError::NotARelation {
                key: key.to_string(),
                found: other.type_name(),
            }
            .into()),
        }
    }

    /// Discards the pending operation for `key`.
    pub fn revert(&self, key: &str) {
        let _writer = self.writer();
        let mut state = self.state();
        if state.pending.remove(key).is_some() {
            debug!(key = %key, "Reverted pending operation");
        }
        match state.confirmed.get(key).cloned() {
            Some(value) => {
                state.attributes.insert(key.to_string(), value);
            }
            None => {
                state.attributes.shift_remove(key);
            }
        }
    }

    /// Discards every pending operation.
    pub fn revert_all(&self) {
        let _writer = self.writer();
        let mut state = self.state();
        debug!(count = state.pending.len(), "Reverted all pending operations");
        state.pending.clear();
        state.attributes = state.confirmed.clone();
    }

    /// The pending operations encoded for a flush.
    pub fn pending_wire(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        let pending = self.pending();
        pending.to_wire()
    }

    /// Installs field data reported by the store.
    ///
    /// `data` holds raw wire fields; they are decoded, replace the confirmed
    /// values of the same fields and the estimates are rebuilt on top of them.
    ///
    /// # Errors
    ///
    /// Fails when a pending operation cannot be estimated over the new data.
    pub fn finish_fetch(&self, data: ValueMap, has_data: bool) -> Result<()> {
        let (id, decoded) = decode_server_fields(data);
        let _writer = self.writer();
        let (confirmed, pending) = {
            let mut state = self.state();
            if id.is_some() {
                state.id = id;
            }
            state.confirmed.extend(decoded);
            state.has_fetched_data = has_data;
            (state.confirmed.clone(), state.pending.clone())
        };

        let attributes = estimate_all(&confirmed, &pending)?;
        debug!(
            fields = confirmed.len(),
            pending = pending.len(),
            "Installed fetched data"
        );
        self.state().attributes = attributes;
        Ok(())
    }

    /// Confirms a flush of the pending operations.
    ///
    /// Each pending field is promoted to its estimate, then the fields of the
    /// store's `response` (raw wire fields) override them. `objectId` in the
    /// response assigns the id. The queue is empty afterwards.
    ///
    /// # Errors
    ///
    /// Fails when a pending operation cannot be estimated over its confirmed
    /// value; the entity is unchanged in that case.
    pub fn finish_save(&self, response: ValueMap) -> Result<()> {
        let (id, decoded) = decode_server_fields(response);
        let _writer = self.writer();
        let (mut confirmed, pending) = {
            let state = self.state();
            (state.confirmed.clone(), state.pending.clone())
        };

        for (key, op) in pending.iter() {
            match op.estimate(confirmed.get(key), key)? {
                Some(value) => {
                    confirmed.insert(key.to_string(), value);
                }
                None => {
                    confirmed.shift_remove(key);
                }
            }
        }
        confirmed.extend(decoded);

        debug!(saved = pending.len(), "Confirmed saved operations");
        let mut state = self.state();
        if id.is_some() {
            state.id = id;
        }
        state.attributes = confirmed.clone();
        state.confirmed = confirmed;
        state.pending.clear();
        Ok(())
    }

    /// The pointer form of this entity.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsavedForwardReference`] when the entity has no
    /// id yet.
    pub fn to_pointer(&self) -> Result<Pointer> {
        let state = self.state();
        match &state.id {
            Some(id) => Ok(Pointer::new(state.class_name.clone(), id.clone())),
            None => Err(CodecError::UnsavedForwardReference {
                class_name: state.class_name.clone(),
            }
            .into()),
        }
    }

    /// The full `Object` wire form, with fields encoded against `seen`.
    pub fn to_full_wire(&self, seen: &[EntityKey]) -> Result<serde_json::Value> {
        let (class_name, id, attributes) = {
            let state = self.state();
            (
                state.class_name.clone(),
                state.id.clone(),
                state.attributes.clone(),
            )
        };

        let mut output = serde_json::Map::with_capacity(attributes.len() + 3);
        output.insert(TYPE_KEY.to_string(), TYPE_OBJECT.into());
        output.insert(CLASS_NAME_KEY.to_string(), class_name.into());
        if let Some(id) = id {
            output.insert(OBJECT_ID_KEY.to_string(), id.into());
        }
        for (key, value) in &attributes {
            output.insert(key.clone(), encode(value, Some(seen), false)?);
        }
        Ok(serde_json::Value::Object(output))
    }

    /// Overwrites a field in place, outside the operation queue.
    ///
    /// Used by traversal to swap nested values. The confirmed value is
    /// updated too unless the field has a pending operation.
    pub(crate) fn replace_field(&self, key: &str, value: Value) {
        let _writer = self.writer();
        let mut state = self.state();
        if state.pending.get(key).is_none() {
            state.confirmed.insert(key.to_string(), value.clone());
        }
        state.attributes.insert(key.to_string(), value);
    }
}

/// Splits `objectId` off raw wire fields and decodes the rest.
fn decode_server_fields(data: ValueMap) -> (Option<String>, ValueMap) {
    let mut id = None;
    let mut decoded = ValueMap::with_capacity(data.len());
    for (key, value) in data {
        let value = match value {
            Value::String(object_id) if key == OBJECT_ID_KEY => {
                id = Some(object_id);
                continue;
            }
            Value::String(iso) if key == CREATED_AT_KEY || key == UPDATED_AT_KEY => {
                parse_date(&iso).map(Value::Date).unwrap_or(Value::Null)
            }
            value => decode(Some(&key), value),
        };
        decoded.insert(key, value);
    }
    (id, decoded)
}

/// Applies every pending operation to the confirmed data.
fn estimate_all(confirmed: &ValueMap, pending: &PendingOps) -> Result<ValueMap> {
    let mut attributes = ValueMap::with_capacity(confirmed.len() + pending.len());
    for (key, value) in confirmed {
        if let Some(value) = pending.estimate(key, Some(value))? {
            attributes.insert(key.clone(), value);
        }
    }
    for (key, op) in pending.iter() {
        if confirmed.contains_key(key) {
            continue;
        }
        if let Some(value) = op.estimate(None, key)? {
            attributes.insert(key.to_string(), value);
        }
    }
    Ok(attributes)
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let identity = |entity: &Entity| {
            let state = entity.state();
            state.id.clone().map(|id| (state.class_name.clone(), id))
        };
        match (identity(self), identity(other)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Fields may lead back to this entity, so they are never printed.
        let state = self.state();
        f.debug_struct("Entity")
            .field("class_name", &state.class_name)
            .field("id", &state.id)
            .field("fields", &state.attributes.len())
            .field("pending", &state.pending.len())
            .field("has_fetched_data", &state.has_fetched_data)
            .finish()
    }
}
