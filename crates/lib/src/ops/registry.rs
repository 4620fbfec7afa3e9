//! Decoding of wire operations by their `__op` tag.
//!
//! The registry maps each operation tag to a decoder. The built-in tags are
//! installed once, when [`OpRegistry::global`] is first used; further tags can
//! be registered at startup. Lookups take a read lock that is released before
//! the decoder runs, so decoders may call back into the registry (as `Batch`
//! does).

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use tracing::debug;

use super::{OpError, Operation, RelationOp};
use crate::{
    Result,
    codec::decode,
    constants::{
        OP_ADD, OP_ADD_RELATION, OP_ADD_UNIQUE, OP_BATCH, OP_DELETE, OP_INCREMENT, OP_KEY,
        OP_REMOVE, OP_REMOVE_RELATION,
    },
    value::{Value, ValueMap},
};

/// Turns the fields of an `{"__op": ...}` map into an [`Operation`].
///
/// The registry is passed in so decoders of nested operations can recurse.
pub type OpDecoder = Arc<dyn Fn(&OpRegistry, &ValueMap) -> Result<Operation> + Send + Sync>;

/// Tag-to-decoder table for wire operations.
pub struct OpRegistry {
    decoders: RwLock<HashMap<String, OpDecoder>>,
}

impl OpRegistry {
    /// An empty registry. Every decode yields `None` until tags are registered.
    pub fn new() -> Self {
        Self {
            decoders: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with the built-in operation tags installed.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(OP_DELETE, |_, _| Ok(Operation::Unset));
        registry.register(OP_INCREMENT, |_, wire| {
            let amount = wire
                .get("amount")
                .and_then(Value::as_f64)
                .ok_or_else(|| malformed(OP_INCREMENT, "missing numeric amount"))?;
            Ok(Operation::Increment(amount))
        });
        registry.register(OP_ADD, |_, wire| {
            Ok(Operation::Add(objects(OP_ADD, wire)?))
        });
        registry.register(OP_ADD_UNIQUE, |_, wire| {
            Ok(Operation::add_unique(objects(OP_ADD_UNIQUE, wire)?))
        });
        registry.register(OP_REMOVE, |_, wire| {
            Ok(Operation::remove(objects(OP_REMOVE, wire)?))
        });
        registry.register(OP_ADD_RELATION, |_, wire| {
            let adds = objects(OP_ADD_RELATION, wire)?;
            Ok(Operation::Relation(RelationOp::new(&adds, &[])?))
        });
        registry.register(OP_REMOVE_RELATION, |_, wire| {
            let removes = objects(OP_REMOVE_RELATION, wire)?;
            Ok(Operation::Relation(RelationOp::new(&[], &removes)?))
        });
        registry.register(OP_BATCH, decode_batch);
        registry
    }

    /// The process-wide registry, created with the built-ins on first use.
    pub fn global() -> &'static OpRegistry {
        static REGISTRY: OnceLock<OpRegistry> = OnceLock::new();
        REGISTRY.get_or_init(OpRegistry::with_builtins)
    }

    /// Installs `decoder` for `tag`, replacing any earlier decoder.
    pub fn register<F>(&self, tag: impl Into<String>, decoder: F)
    where
        F: Fn(&OpRegistry, &ValueMap) -> Result<Operation> + Send + Sync + 'static,
    {
        let tag = tag.into();
        let mut decoders = self.decoders.write().unwrap_or_else(PoisonError::into_inner);
        if decoders.insert(tag.clone(), Arc::new(decoder)).is_some() {
            debug!(tag = %tag, "Replaced operation decoder");
        }
    }

    /// Whether a decoder is installed for `tag`.
    pub fn contains(&self, tag: &str) -> bool {
        self.decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        tags.sort();
        tags
    }

    /// Decodes an `{"__op": ...}` map.
    ///
    /// Returns `Ok(None)` when the map has no string `__op` or its tag is not
    /// registered; callers decide whether to ignore that or report it.
    ///
    /// # Errors
    ///
    /// Fails when the decoder for a registered tag rejects the payload.
    pub fn decode(&self, wire: &ValueMap) -> Result<Option<Operation>> {
        let Some(tag) = wire.get(OP_KEY).and_then(Value::as_str) else {
            return Ok(None);
        };
        let decoder = self
            .decoders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .cloned();
        match decoder {
            Some(decoder) => decoder(self, wire).map(Some),
            None => {
                debug!(tag = %tag, "No decoder registered for operation tag");
                Ok(None)
            }
        }
    }

    /// Decodes a raw JSON operation; see [`OpRegistry::decode`].
    pub fn decode_json(&self, wire: serde_json::Value) -> Result<Option<Operation>> {
        match Value::from_json(wire) {
            Value::Map(map) => self.decode(&map),
            _ => Ok(None),
        }
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

fn malformed(tag: &str, reason: impl Into<String>) -> crate::Error {
    OpError::MalformedOperation {
        tag: tag.to_string(),
        reason: reason.into(),
    }
    .into()
}

/// The decoded `objects` array of an array or relation operation.
fn objects(tag: &str, wire: &ValueMap) -> Result<Vec<Value>> {
    match wire.get("objects") {
        Some(objects @ Value::Array(_)) => match decode(None, objects.clone()) {
            Value::Array(items) => Ok(items),
            _ => Err(malformed(tag, "objects did not decode to an array")),
        },
        Some(other) => Err(malformed(
            tag,
            format!("objects must be an array, found {}", other.type_name()),
        )),
        None => Err(malformed(tag, "missing objects")),
    }
}

/// Folds the nested operations of a batch left to right.
fn decode_batch(registry: &OpRegistry, wire: &ValueMap) -> Result<Operation> {
    let ops = wire
        .get("ops")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed(OP_BATCH, "missing ops array"))?;

    let mut folded: Option<Operation> = None;
    for (index, nested) in ops.iter().enumerate() {
        let map = nested
            .as_map()
            .ok_or_else(|| malformed(OP_BATCH, format!("ops[{index}] is not an operation")))?;
        let op = registry.decode(map)?.ok_or_else(|| {
            malformed(OP_BATCH, format!("ops[{index}] has an unrecognized tag"))
        })?;
        folded = Some(op.merge_with_previous(folded.as_ref())?);
    }
    folded.ok_or_else(|| malformed(OP_BATCH, "empty batch"))
}
