//! The value codec.
//!
//! [`encode`] turns in-memory [`Value`](crate::value::Value)s into the tagged
//! JSON exchanged with the remote store; [`decode`] and [`decode_json`] turn
//! that JSON back into values. The `__type` and `__op` strings only exist on
//! the wire; they are resolved into the value and operation sum types at this
//! boundary.
//!
//! | Tag | Shape |
//! |---|---|
//! | `Date` | `{__type:"Date", iso}` |
//! | `GeoPoint` | `{__type:"GeoPoint", latitude, longitude}` |
//! | `Pointer` | `{__type:"Pointer", className, objectId}` |
//! | `Object` | `{__type:"Object", className, objectId, ...fields}` |
//! | `Relation` | `{__type:"Relation", className}` |
//! | `File` | `{__type:"File", name, url}` |

mod date;
mod decode;
mod encode;
pub mod errors;
mod wire;

pub use date::{format_date, parse_date};
pub use decode::{decode, decode_json};
pub use encode::encode;
pub use errors::CodecError;
