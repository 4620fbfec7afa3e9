//! The tagged value model.
//!
//! [`Value`] is the closed set of in-memory values that can be stored in an
//! entity field and exchanged with the remote store. Plain JSON kinds map
//! one-to-one onto their wire form; the typed kinds (dates, geo points,
//! entities, attachments, relations, access lists) have a tagged wire form
//! produced by [`crate::codec::encode`] and recognised by
//! [`crate::codec::decode`].
//!
//! Values lifted from raw JSON with [`Value::from_json`] are *not* yet
//! interpreted: a `{"__type": "Date", ...}` object stays a [`Value::Map`]
//! until it passes through the decoder.

use std::fmt;

use indexmap::IndexMap;

use crate::{entity::Entity, ops::Operation};

pub mod errors;
mod types;

pub use errors::ValueError;
pub use types::{AccessList, Attachment, GeoPoint, Pattern, Pointer, RelationRef};

/// Field map of an entity or a plain map value.
///
/// Equality ignores insertion order, iteration (and therefore re-encoding)
/// preserves it.
pub type ValueMap = IndexMap<String, Value>;

/// Values that can be stored in an entity field.
///
/// # Value Kinds
///
/// ## Plain values
/// - [`Value::Null`], [`Value::Bool`], [`Value::Number`], [`Value::String`]
/// - [`Value::Array`] and [`Value::Map`] containers
///
/// ## Typed values
/// - [`Value::Date`] - a UTC instant with millisecond precision on the wire
/// - [`Value::GeoPoint`] - latitude/longitude pair
/// - [`Value::Entity`] - a shared handle to an entity, either a pointer stub or fully fetched
/// - [`Value::Attachment`] - a named file, encodable once it has a remote url
/// - [`Value::Relation`] - a many-to-many reference field
/// - [`Value::AccessList`] - opaque access-control data
/// - [`Value::Pattern`] - a regular-expression-like value, encoded as its source
/// - [`Value::Op`] - an operation carried as a value
///
/// Cycles are only possible through [`Value::Entity`] handles.
///
/// # Equality
///
/// Entities compare by `(class, id)` once saved and by handle identity
/// before that; everything else compares structurally.
///
/// ```
/// # use opwire::value::Value;
/// assert_eq!(Value::from("hello"), "hello");
/// assert_eq!(Value::from(42), 42.0);
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Map(ValueMap),
    Date(chrono::DateTime<chrono::Utc>),
    GeoPoint(GeoPoint),
    Entity(Entity),
    Attachment(Attachment),
    Relation(RelationRef),
    AccessList(AccessList),
    Pattern(Pattern),
    Op(Box<Operation>),
}

impl Value {
    /// Lift raw JSON into the value model without interpreting any tags.
    ///
    /// Objects become [`Value::Map`] and arrays become [`Value::Array`];
    /// numbers are widened to `f64`.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts plain values back to JSON.
    ///
    /// Returns `None` as soon as a typed value is found anywhere in the
    /// structure; use [`crate::codec::encode`] for those.
    pub fn to_plain_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Number(n) => Some(number_to_json(*n)),
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Value::to_plain_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| v.to_plain_json().map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(serde_json::Value::Object),
            _ => None,
        }
    }

    /// Returns the kind name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Date(_) => "date",
            Value::GeoPoint(_) => "geopoint",
            Value::Entity(_) => "entity",
            Value::Attachment(_) => "attachment",
            Value::Relation(_) => "relation",
            Value::AccessList(_) => "acl",
            Value::Pattern(_) => "pattern",
            Value::Op(_) => "operation",
        }
    }

    /// Returns true if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for the plain JSON kinds.
    pub fn is_plain(&self) -> bool {
        matches!(
            self,
            Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)
                | Value::Array(_)
                | Value::Map(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Value::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_relation(&self) -> Option<&RelationRef> {
        match self {
            Value::Relation(relation) => Some(relation),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        match self {
            Value::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_op(&self) -> Option<&Operation> {
        match self {
            Value::Op(op) => Some(op),
            _ => None,
        }
    }
}

/// Encodes a number the way the remote store expects it.
///
/// Integral values inside the exactly-representable range are emitted as JSON
/// integers so `17.0` travels as `17`. Non-finite values become `null`.
pub(crate) fn number_to_json(n: f64) -> serde_json::Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return serde_json::Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", number_to_json(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Date(date) => write!(f, "{}", crate::codec::format_date(date)),
            Value::GeoPoint(point) => write!(f, "({}, {})", point.latitude, point.longitude),
            Value::Entity(entity) => match entity.id() {
                Some(id) => write!(f, "{}:{id}", entity.class_name()),
                None => write!(f, "{}:<new>", entity.class_name()),
            },
            Value::Attachment(file) => write!(f, "file:{}", file.name),
            Value::Relation(relation) => write!(
                f,
                "relation<{}>",
                relation.target_class.as_deref().unwrap_or("?")
            ),
            Value::AccessList(_) => write!(f, "<acl>"),
            Value::Pattern(pattern) => write!(f, "/{}/{}", pattern.source, pattern.flags),
            Value::Op(op) => write!(f, "<{}>", op.kind()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Map(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        Value::Date(value)
    }
}

impl From<GeoPoint> for Value {
    fn from(value: GeoPoint) -> Self {
        Value::GeoPoint(value)
    }
}

impl From<Entity> for Value {
    fn from(value: Entity) -> Self {
        Value::Entity(value)
    }
}

impl From<&Entity> for Value {
    fn from(value: &Entity) -> Self {
        Value::Entity(value.clone())
    }
}

impl From<Attachment> for Value {
    fn from(value: Attachment) -> Self {
        Value::Attachment(value)
    }
}

impl From<RelationRef> for Value {
    fn from(value: RelationRef) -> Self {
        Value::Relation(value)
    }
}

impl From<AccessList> for Value {
    fn from(value: AccessList) -> Self {
        Value::AccessList(value)
    }
}

impl From<Pattern> for Value {
    fn from(value: Pattern) -> Self {
        Value::Pattern(value)
    }
}

impl From<Operation> for Value {
    fn from(value: Operation) -> Self {
        Value::Op(Box::new(value))
    }
}

impl TryFrom<&Value> for String {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(ValueError::TypeMismatch {
                expected: "string",
                actual: value.type_name(),
            }),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => Ok(*n),
            _ => Err(ValueError::TypeMismatch {
                expected: "number",
                actual: value.type_name(),
            }),
        }
    }
}

impl TryFrom<&Value> for bool {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(ValueError::TypeMismatch {
                expected: "bool",
                actual: value.type_name(),
            }),
        }
    }
}

impl TryFrom<&Value> for Entity {
    type Error = ValueError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Entity(entity) => Ok(entity.clone()),
            _ => Err(ValueError::TypeMismatch {
                expected: "entity",
                actual: value.type_name(),
            }),
        }
    }
}

// PartialEq implementations for comparing Value with primitives
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::String(s) if s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Number(n) if n == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Bool(b) if b == other)
    }
}
