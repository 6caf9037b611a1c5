//! Host-side decoded values for heterogeneous schemas.
//!
//! Objects, tuples and discriminated unions mix property types, so they decode into the
//! dynamic [`Value`] model. Typed codecs join those composites through
//! [`CodecValue`], which converts a typed value into a [`Value`] and back.
use std::fmt;

use indexmap::IndexMap;
use num_bigint::BigInt;
use ordered_float::OrderedFloat;

use crate::error::{CodecError, Result};
use crate::json::{JsonKind, MAX_SAFE_INTEGER};

pub type Record = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    Array(Vec<Value>),
    Object(Record),
}

impl Value {
    pub fn kind(&self) -> JsonKind {
        match self {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(_) | Value::BigInt(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }

    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|m| m.get(key))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Build a [`Record`] from `(name, value)` pairs, keeping their order.
pub fn record<K, V, I>(entries: I) -> Record
where
    K: Into<String>,
    V: CodecValue,
    I: IntoIterator<Item = (K, V)>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v.into_value())).collect()
}

// ————————————————————————————————————————————————————————————————————————————
// LITERALS
// ————————————————————————————————————————————————————————————————————————————

/// A single scalar value: what literal codecs, enumerations and discriminators compare
/// against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    BigInt(BigInt),
    String(String),
}

impl Literal {
    pub fn kind(&self) -> JsonKind {
        match self {
            Literal::Null => JsonKind::Null,
            Literal::Bool(_) => JsonKind::Bool,
            Literal::Number(_) | Literal::BigInt(_) => JsonKind::Number,
            Literal::String(_) => JsonKind::String,
        }
    }

    pub fn from_value(value: &Value) -> Option<Literal> {
        match value {
            Value::Null => Some(Literal::Null),
            Value::Bool(b) => Some(Literal::Bool(*b)),
            Value::Number(n) => Some(Literal::Number(OrderedFloat(*n))),
            Value::BigInt(n) => Some(Literal::BigInt(n.clone())),
            Value::String(s) => Some(Literal::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) if n.0.fract() == 0.0 && n.0.abs() <= MAX_SAFE_INTEGER => {
                write!(f, "{}", n.0 as i64)
            }
            Literal::Number(n) => write!(f, "{}", n.0),
            Literal::BigInt(n) => write!(f, "{n}n"),
            Literal::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<()> for Literal {
    fn from(_: ()) -> Self {
        Literal::Null
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Number(OrderedFloat(n))
    }
}

impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Number(OrderedFloat(n as f64))
    }
}

impl From<BigInt> for Literal {
    fn from(n: BigInt) -> Self {
        Literal::BigInt(n)
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSIONS
// ————————————————————————————————————————————————————————————————————————————

/// Types that can travel through the dynamic [`Value`] model.
pub trait CodecValue: Sized + Send + Sync + 'static {
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(expected: JsonKind, value: &Value) -> Result<T> {
    Err(CodecError::expected(expected, value.kind()))
}

impl CodecValue for Value {
    fn into_value(self) -> Value {
        self
    }
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl CodecValue for Record {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Object(m) => Ok(m.clone()),
            other => mismatch(JsonKind::Object, other),
        }
    }
}

impl CodecValue for f64 {
    fn into_value(self) -> Value {
        Value::Number(self)
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(*n),
            other => mismatch(JsonKind::Number, other),
        }
    }
}

impl CodecValue for f32 {
    fn into_value(self) -> Value {
        Value::Number(self as f64)
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => Ok(*n as f32),
            other => mismatch(JsonKind::Number, other),
        }
    }
}

impl CodecValue for BigInt {
    fn into_value(self) -> Value {
        Value::BigInt(self)
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::BigInt(n) => Ok(n.clone()),
            other => mismatch(JsonKind::Number, other),
        }
    }
}

impl CodecValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => mismatch(JsonKind::String, other),
        }
    }
}

impl CodecValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => mismatch(JsonKind::Bool, other),
        }
    }
}

impl CodecValue for Literal {
    fn into_value(self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(b),
            Literal::Number(n) => Value::Number(n.0),
            Literal::BigInt(n) => Value::BigInt(n),
            Literal::String(s) => Value::String(s),
        }
    }
    fn from_value(value: &Value) -> Result<Self> {
        Literal::from_value(value).ok_or_else(|| {
            CodecError::InvalidSchema(format!("{} cannot be held as a literal", value.kind()))
        })
    }
}

impl<T: CodecValue> CodecValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            None => Value::Null,
            Some(x) => x.into_value(),
        }
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: CodecValue> CodecValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::Array(self.into_iter().map(CodecValue::into_value).collect())
    }
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(xs) => xs
                .iter()
                .enumerate()
                .map(|(i, x)| T::from_value(x).map_err(|e| e.at(i)))
                .collect(),
            other => mismatch(JsonKind::Array, other),
        }
    }
}

// Fixed-width integers convert losslessly or not at all.
macro_rules! small_int_value {
    ($($t:ty),*) => {$(
        impl CodecValue for $t {
            fn into_value(self) -> Value {
                Value::Number(self as f64)
            }
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Number(n) if n.fract() == 0.0 && *n >= <$t>::MIN as f64 && *n <= <$t>::MAX as f64 => {
                        Ok(*n as $t)
                    }
                    Value::Number(n) => Err(CodecError::NotAnInteger(n.to_string())),
                    other => mismatch(JsonKind::Number, other),
                }
            }
        }
    )*};
}

small_int_value!(i8, i16, i32, u8, u16, u32);

macro_rules! wide_int_value {
    ($($t:ty),*) => {$(
        impl CodecValue for $t {
            fn into_value(self) -> Value {
                Value::BigInt(BigInt::from(self))
            }
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::BigInt(n) => <$t>::try_from(n).map_err(|_| CodecError::NotAnInteger(n.to_string())),
                    other => mismatch(JsonKind::Number, other),
                }
            }
        }
    )*};
}

wide_int_value!(i64, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_numbers_compare_by_value() {
        assert_eq!(Literal::from(2000.0), Literal::from(2000));
        assert_eq!(Literal::from(0.0), Literal::from(-0.0));
        assert_ne!(Literal::from(1), Literal::from(BigInt::from(1)));
        assert_ne!(Literal::from("1"), Literal::from(1));
    }

    #[test]
    fn literal_display() {
        assert_eq!(Literal::from(3).to_string(), "3");
        assert_eq!(Literal::from(0.5).to_string(), "0.5");
        assert_eq!(Literal::from("a").to_string(), "\"a\"");
        assert_eq!(Literal::from(BigInt::from(7)).to_string(), "7n");
        assert_eq!(Literal::Null.to_string(), "null");
    }

    #[test]
    fn small_ints_refuse_lossy_values() {
        assert_eq!(i8::from_value(&Value::Number(-128.0)).unwrap(), -128);
        assert!(i8::from_value(&Value::Number(128.0)).is_err());
        assert!(u16::from_value(&Value::Number(1.5)).is_err());
        assert!(u8::from_value(&Value::String("1".into())).is_err());
    }

    #[test]
    fn nested_conversion_errors_carry_index() {
        let value = Value::Array(vec![Value::Bool(true), Value::Null]);
        let err = Vec::<bool>::from_value(&value).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "$[1]");
        assert_eq!(Vec::<Option<bool>>::from_value(&value).unwrap(), vec![Some(true), None]);
    }

    #[test]
    fn record_helper_keeps_order() {
        let r = record([("b", 1.0), ("a", 2.0)]);
        assert_eq!(r.keys().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(r["a"], Value::Number(2.0));
    }
}
