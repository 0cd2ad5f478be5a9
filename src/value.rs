use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

/// Zulu timestamp layout used for date-valued comparisons (RFC 4517 style).
///
/// Date values are rendered into this fixed text form when a filter is
/// constructed, so every date comparison is a plain text comparison.
pub const ZULU_FORMAT: &str = "%Y%m%d%H%M%SZ";

/// A document node in a SCIM-style resource.
///
/// This type represents all node kinds a directory resource can carry:
/// the JSON types plus a distinct binary kind, with integers preserved
/// separately from floats.
///
/// # Equality and hashing
///
/// Equality and hashing are structural and mutually consistent: floats
/// compare and hash by bit pattern, objects compare and hash independent
/// of field order. Two values are equal iff their shapes and contents
/// match.
///
/// # Examples
///
/// ```
/// use scim_filter::Value;
///
/// let name = Value::from("bjensen");
/// let age = Value::from(42);
/// let tags = Value::Array(vec![Value::from("staff"), Value::from("vip")]);
///
/// assert!(!name.is_empty());
/// assert!(Value::Null.is_empty());
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Explicit null
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// Raw byte sequence
    Binary(Vec<u8>),

    /// Ordered sequence of nodes
    Array(Vec<Value>),

    /// Object with insertion-ordered fields
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Whether this node counts as empty.
    ///
    /// An absent attribute, an explicit null and an empty array are
    /// equivalent states: null is empty, and an array is empty iff every
    /// element is recursively empty. Everything else is non-empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Array(elements) => elements.iter().all(Value::is_empty),
            _ => false,
        }
    }

    /// Human-readable node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Borrow the string content, if this is a string node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content as an exact decimal, if this is a number node.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(n) => Decimal::from_i64(*n),
            Value::Float(n) => Decimal::from_f64(*n),
            _ => None,
        }
    }

    /// Convert a `serde_json` value into a document node.
    ///
    /// Whole numbers become integers, everything else numeric becomes a
    /// float. Object field order is preserved.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(elements) => {
                Value::Array(elements.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert this node into a `serde_json` value.
    ///
    /// Binary nodes are rendered as base64 text. Non-finite floats have no
    /// JSON representation and collapse to null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::Number((*n).into()),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Binary(bytes) => serde_json::Value::String(BASE64.encode(bytes)),
            Value::Array(elements) => {
                serde_json::Value::Array(elements.iter().map(Value::to_json).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            // bitwise so that equality stays total and consistent with Hash
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Boolean(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Value::Integer(n) => {
                state.write_u8(2);
                n.hash(state);
            }
            Value::Float(n) => {
                state.write_u8(3);
                n.to_bits().hash(state);
            }
            Value::String(s) => {
                state.write_u8(4);
                s.hash(state);
            }
            Value::Binary(bytes) => {
                state.write_u8(5);
                bytes.hash(state);
            }
            Value::Array(elements) => {
                state.write_u8(6);
                elements.len().hash(state);
                for element in elements {
                    element.hash(state);
                }
            }
            Value::Object(fields) => {
                // field order must not influence the hash, matching the
                // order-insensitive equality of IndexMap
                state.write_u8(7);
                fields.len().hash(state);
                let mut combined: u64 = 0;
                for (key, value) in fields {
                    let mut entry = DefaultHasher::new();
                    key.hash(&mut entry);
                    value.hash(&mut entry);
                    combined = combined.wrapping_add(entry.finish());
                }
                state.write_u64(combined);
            }
        }
    }
}

impl fmt::Display for Value {
    /// Renders the filter-literal form: JSON scalars, base64 text for
    /// binary, JSON syntax for arrays and objects.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            other => {
                let text = serde_json::to_string(&other.to_json()).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Binary(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        if value.is_integer()
            && let Some(n) = value.to_i64()
        {
            return Value::Integer(n);
        }
        Value::Float(value.to_f64().unwrap_or(f64::NAN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    /// Dates are fixed to their Zulu text form at construction time, so
    /// all date comparisons become text comparisons.
    fn from(value: DateTime<Tz>) -> Self {
        Value::String(value.with_timezone(&Utc).format(ZULU_FORMAT).to_string())
    }
}
