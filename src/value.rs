//! Scalar values and records fed into the profilers.

use crate::field_type::Type;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single scalar cell.
///
/// `Missing` means absent in the source (an empty CSV field, a key a row
/// does not have). `Null` is an explicit null from structured input.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    Null,
    Missing,
}

/// One tabular row: column name to value, in column order.
pub type Record = IndexMap<String, Value>;

impl Value {
    /// Primitive tag of a present value; `None` for `Null` and `Missing`.
    pub fn tag(&self) -> Option<Type> {
        match self {
            Value::Number(_) => Some(Type::Number),
            Value::String(_) => Some(Type::String),
            Value::Boolean(_) => Some(Type::Boolean),
            Value::Date(_) => Some(Type::Date),
            Value::Null | Value::Missing => None,
        }
    }

    /// True for `Null` and `Missing`; tabular profiling counts both as missing.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Null | Value::Missing)
    }

    /// The number, if this is a finite `Number`.
    #[inline]
    pub fn as_finite(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort numeric coercion: numbers as-is, numeric text parsed,
    /// booleans as 0/1.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            Value::Boolean(b) => Some(f64::from(u8::from(*b))),
            Value::Date(ms) => Some(*ms as f64),
            Value::Null | Value::Missing => None,
        }
    }
}

/// Number identity for hashing: `-0` folds into `0`, every NaN is one value.
fn number_key(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => number_key(*a) == number_key(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Null, Value::Null) | (Value::Missing, Value::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Number(n) => number_key(*n).hash(state),
            Value::String(s) => s.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Date(ms) => ms.hash(state),
            Value::Null | Value::Missing => {}
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Date(ms) => serializer.serialize_i64(*ms),
            Value::Null | Value::Missing => serializer.serialize_none(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Date(ms) => match chrono::DateTime::from_timestamp_millis(*ms) {
                Some(dt) => write!(f, "{}", dt.to_rfc3339()),
                None => write!(f, "{ms}"),
            },
            Value::Null => f.write_str("null"),
            Value::Missing => Ok(()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&serde_json::Value> for Value {
    /// Scalars map one to one. Arrays and objects have no scalar
    /// counterpart and are kept as their JSON text.
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            nested => Value::String(nested.to_string()),
        }
    }
}
