//! Duplicate-free item lists for `AddUnique` and `Remove`.

use crate::value::Value;

/// Whether two array items count as the same item for `AddUnique` and
/// `Remove`.
///
/// Saved entities match by class and id, unsaved entities by handle identity
/// and scalars by value. Maps, arrays and the other typed values never match,
/// even with identical contents: only the same reference would, and owned
/// values have none to share.
pub(crate) fn same_item(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Entity(left), Value::Entity(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Number(left), Value::Number(right)) => left == right,
        (Value::String(left), Value::String(right)) => left == right,
        _ => false,
    }
}

/// An ordered list of values without duplicates.
///
/// Duplicates are dropped at construction, keeping the first occurrence.
/// Membership follows [`same_item`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemSet(Vec<Value>);

impl ItemSet {
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.iter().any(|existing| same_item(existing, &item)) {
                unique.push(item);
            }
        }
        Self(unique)
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item: &Value) -> bool {
        self.0.iter().any(|existing| same_item(existing, item))
    }

    /// Items of `self` followed by the items of `other` not already present.
    pub fn union(&self, other: &ItemSet) -> ItemSet {
        Self::new(self.0.iter().chain(other.0.iter()).cloned())
    }
}

impl FromIterator<Value> for ItemSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a ItemSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
