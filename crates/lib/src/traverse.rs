//! Depth-first traversal of value graphs.
//!
//! Entities can reference each other in cycles, so every walk remembers the
//! entities it has entered and never enters one twice.

use std::collections::HashSet;

use tracing::trace;

use crate::{
    entity::{Entity, EntityKey},
    value::Value,
};

/// Visits every value reachable from `root`, children before parents.
///
/// When `visit` returns `Some(replacement)` for a child of an array, a map or
/// an entity, the child is replaced in place. The result of visiting `root`
/// itself is returned to the caller.
///
/// Entities are entered through their estimated fields. An entity reached a
/// second time in the same call is skipped: it is neither entered nor
/// visited, and contributes `None`.
pub fn traverse<F>(root: &mut Value, mut visit: F) -> Option<Value>
where
    F: FnMut(&Value) -> Option<Value>,
{
    let mut walker = Walker {
        visit: &mut visit,
        seen: HashSet::new(),
        replaced: 0,
    };
    walker.walk(root)
}

/// Every distinct entity handle reachable from `root`, in visit order.
pub fn entities(root: &Value) -> Vec<Entity> {
    let mut root = root.clone();
    let mut found = Vec::new();
    traverse(&mut root, |value| {
        if let Value::Entity(entity) = value {
            found.push(entity.clone());
        }
        None
    });
    found
}

struct Walker<'a> {
    visit: &'a mut dyn FnMut(&Value) -> Option<Value>,
    seen: HashSet<EntityKey>,
    replaced: usize,
}

impl Walker<'_> {
    fn walk(&mut self, value: &mut Value) -> Option<Value> {
        match value {
            Value::Entity(entity) => {
                if !self.seen.insert(entity.key()) {
                    trace!(class_name = %entity.class_name(), "Skipping entity already visited");
                    return None;
                }
                let entity = entity.clone();
                self.walk_entity(&entity);
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.walk_child(item);
                }
            }
            Value::Map(map) => {
                for item in map.values_mut() {
                    self.walk_child(item);
                }
            }
            _ => {}
        }
        (self.visit)(value)
    }

    fn walk_child(&mut self, child: &mut Value) {
        if let Some(replacement) = self.walk(child) {
            *child = replacement;
            self.replaced += 1;
        }
    }

    fn walk_entity(&mut self, entity: &Entity) {
        for (key, mut field) in entity.attributes() {
            let before = self.replaced;
            match self.walk(&mut field) {
                Some(replacement) => {
                    entity.replace_field(&key, replacement);
                    self.replaced += 1;
                }
                None if self.replaced != before => entity.replace_field(&key, field),
                None => {}
            }
        }
    }
}
