//! In-memory JSON trees.
//!
//! Two input models exist only to preserve numeric precision:
//! - [`UnsafeJson`]: numbers held as `f64` (fast, lossy beyond 2^53)
//! - [`SafeJson`]: numbers held as [`SafeNumber`], an approximation plus the exact
//!   source numeral
//!
//! [`OutJson`] is the encode side; its [`OutJson::ExactInteger`] variant is written as a
//! bare numeral so big integers survive serialization.
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::ser::{Error as _, Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::Result;

pub type SafeObject = IndexMap<String, SafeJson>;
pub type UnsafeObject = IndexMap<String, UnsafeJson>;
pub type OutObject = IndexMap<String, OutJson>;

/// Largest integer magnitude an `f64` holds exactly.
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SAFE MODEL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub struct SafeNumber {
    pub value: f64,
    pub source: String,
}

impl SafeNumber {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        // Valid JSON numerals always parse; overflow becomes ±inf.
        let value = source.parse::<f64>().unwrap_or(f64::NAN);
        SafeNumber { value, source }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SafeJson {
    Null,
    Bool(bool),
    Number(SafeNumber),
    String(String),
    Array(Vec<SafeJson>),
    Object(SafeObject),
}

impl SafeJson {
    pub fn kind(&self) -> JsonKind {
        match self {
            SafeJson::Null => JsonKind::Null,
            SafeJson::Bool(_) => JsonKind::Bool,
            SafeJson::Number(_) => JsonKind::Number,
            SafeJson::String(_) => JsonKind::String,
            SafeJson::Array(_) => JsonKind::Array,
            SafeJson::Object(_) => JsonKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SafeJson::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SafeJson::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&SafeNumber> {
        match self {
            SafeJson::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SafeJson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[SafeJson]> {
        match self {
            SafeJson::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&SafeObject> {
        match self {
            SafeJson::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for SafeJson {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SafeJson::Null,
            serde_json::Value::Bool(b) => SafeJson::Bool(b),
            // arbitrary_precision keeps the numeral exactly as written
            serde_json::Value::Number(n) => SafeJson::Number(SafeNumber::new(n.to_string())),
            serde_json::Value::String(s) => SafeJson::String(s),
            serde_json::Value::Array(xs) => SafeJson::Array(xs.into_iter().map(SafeJson::from).collect()),
            serde_json::Value::Object(m) => {
                SafeJson::Object(m.into_iter().map(|(k, v)| (k, SafeJson::from(v))).collect())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// UNSAFE MODEL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum UnsafeJson {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<UnsafeJson>),
    Object(UnsafeObject),
}

impl UnsafeJson {
    pub fn kind(&self) -> JsonKind {
        match self {
            UnsafeJson::Null => JsonKind::Null,
            UnsafeJson::Bool(_) => JsonKind::Bool,
            UnsafeJson::Number(_) => JsonKind::Number,
            UnsafeJson::String(_) => JsonKind::String,
            UnsafeJson::Array(_) => JsonKind::Array,
            UnsafeJson::Object(_) => JsonKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, UnsafeJson::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            UnsafeJson::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            UnsafeJson::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            UnsafeJson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[UnsafeJson]> {
        match self {
            UnsafeJson::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&UnsafeObject> {
        match self {
            UnsafeJson::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for UnsafeJson {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => UnsafeJson::Null,
            serde_json::Value::Bool(b) => UnsafeJson::Bool(b),
            serde_json::Value::Number(n) => {
                UnsafeJson::Number(n.to_string().parse::<f64>().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(s) => UnsafeJson::String(s),
            serde_json::Value::Array(xs) => UnsafeJson::Array(xs.into_iter().map(UnsafeJson::from).collect()),
            serde_json::Value::Object(m) => {
                UnsafeJson::Object(m.into_iter().map(|(k, v)| (k, UnsafeJson::from(v))).collect())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// OUTPUT MODEL
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq)]
pub enum OutJson {
    Null,
    Bool(bool),
    Number(f64),
    /// Decimal integer text written without quotes.
    ExactInteger(String),
    String(String),
    Array(Vec<OutJson>),
    Object(OutObject),
}

impl OutJson {
    pub fn kind(&self) -> JsonKind {
        match self {
            OutJson::Null => JsonKind::Null,
            OutJson::Bool(_) => JsonKind::Bool,
            OutJson::Number(_) | OutJson::ExactInteger(_) => JsonKind::Number,
            OutJson::String(_) => JsonKind::String,
            OutJson::Array(_) => JsonKind::Array,
            OutJson::Object(_) => JsonKind::Object,
        }
    }
}

impl Serialize for OutJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutJson::Null => serializer.serialize_unit(),
            OutJson::Bool(b) => serializer.serialize_bool(*b),
            OutJson::Number(n) => serialize_number(*n, serializer),
            OutJson::ExactInteger(digits) => serde_json::Number::from_str(digits)
                .map_err(S::Error::custom)?
                .serialize(serializer),
            OutJson::String(s) => serializer.serialize_str(s),
            OutJson::Array(xs) => {
                let mut seq = serializer.serialize_seq(Some(xs.len()))?;
                for x in xs {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            OutJson::Object(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

// Integral values print without a fraction (`1`, not `1.0`); non-finite values have no
// JSON spelling and are written as null.
fn serialize_number<S: Serializer>(n: f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !n.is_finite() {
        serializer.serialize_unit()
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(n as i64)
    } else {
        serializer.serialize_f64(n)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TEXT
// ————————————————————————————————————————————————————————————————————————————

/// Lex text into the precision-preserving model.
pub fn parse_safe(text: &str) -> Result<SafeJson> {
    let tree = serde_json::from_str::<serde_json::Value>(text)?;
    Ok(SafeJson::from(tree))
}

/// Lex text into the native-float model.
pub fn parse_unsafe(text: &str) -> Result<UnsafeJson> {
    let tree = serde_json::from_str::<serde_json::Value>(text)?;
    Ok(UnsafeJson::from(tree))
}

/// Compact wire text for an encoded tree.
pub fn to_text(out: &OutJson) -> Result<String> {
    Ok(serde_json::to_string(out)?)
}
