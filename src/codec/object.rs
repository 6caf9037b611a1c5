//! Closed-schema JSON objects.
//!
//! Every property of the input must be declared; every required property must be
//! present. Decoded records keep the input's key order.
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{Codec, CodecRef, JsonCodec, Optional};
use crate::dynamic::{CodecValue, Record, Value};
use crate::error::{CodecError, Result};
use crate::json::{JsonKind, OutJson, SafeJson, UnsafeJson};

#[derive(Clone)]
pub struct PropertyCodec {
    pub codec: Codec<Value>,
    pub required: bool,
}

/// Anything that can describe one object property.
pub trait IntoProperty {
    fn into_property(self) -> PropertyCodec;
}

impl<T: CodecValue> IntoProperty for Codec<T> {
    fn into_property(self) -> PropertyCodec {
        PropertyCodec { codec: self.erased(), required: true }
    }
}

impl<T: CodecValue> IntoProperty for &Codec<T> {
    fn into_property(self) -> PropertyCodec {
        PropertyCodec { codec: self.erased(), required: true }
    }
}

impl<T: CodecValue> IntoProperty for Optional<T> {
    fn into_property(self) -> PropertyCodec {
        PropertyCodec { codec: self.codec().erased(), required: false }
    }
}

impl IntoProperty for ObjectCodec {
    fn into_property(self) -> PropertyCodec {
        self.codec.into_property()
    }
}

impl IntoProperty for &ObjectCodec {
    fn into_property(self) -> PropertyCodec {
        (&self.codec).into_property()
    }
}

impl IntoProperty for PropertyCodec {
    fn into_property(self) -> PropertyCodec {
        self
    }
}

pub struct ObjectSchema {
    properties: IndexMap<String, PropertyCodec>,
    required: usize,
}

impl ObjectSchema {
    fn new(properties: IndexMap<String, PropertyCodec>) -> Self {
        let required = properties.values().filter(|p| p.required).count();
        ObjectSchema { properties, required }
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyCodec> {
        &self.properties
    }

    fn property(&self, name: &str) -> Result<&PropertyCodec> {
        self.properties
            .get(name)
            .ok_or_else(|| CodecError::UnexpectedProperty(name.to_string()))
    }

    fn missing(&self, present: impl Fn(&str) -> bool) -> CodecError {
        let names = self
            .properties
            .iter()
            .filter(|(name, p)| p.required && !present(name.as_str()))
            .map(|(name, _)| name.clone())
            .collect();
        CodecError::MissingProperties(names)
    }

    fn decode_with<J>(
        &self,
        entries: &IndexMap<String, J>,
        decode: impl Fn(&Codec<Value>, &J) -> Result<Value>,
    ) -> Result<Record> {
        let mut record = Record::with_capacity(entries.len());
        let mut observed = 0;
        for (name, src) in entries {
            let property = self.property(name)?;
            if property.required {
                observed += 1;
            }
            let value = decode(&property.codec, src).map_err(|e| e.at(name.as_str()))?;
            record.insert(name.clone(), value);
        }
        if observed != self.required {
            return Err(self.missing(|name| entries.contains_key(name)));
        }
        Ok(record)
    }
}

struct ObjectCodecImpl {
    schema: Arc<ObjectSchema>,
}

impl JsonCodec<Record> for ObjectCodecImpl {
    fn decode(&self, src: &SafeJson) -> Result<Record> {
        let entries = src.as_object().ok_or_else(|| CodecError::expected(JsonKind::Object, src.kind()))?;
        self.schema.decode_with(entries, |codec, x| codec.decode(x))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Record> {
        let entries = src.as_object().ok_or_else(|| CodecError::expected(JsonKind::Object, src.kind()))?;
        self.schema.decode_with(entries, |codec, x| codec.decode_unsafe(x))
    }

    fn encode(&self, x: &Record) -> Result<OutJson> {
        let mut out = IndexMap::with_capacity(x.len());
        let mut encoded = 0;
        for (name, value) in x {
            let property = self.schema.property(name)?;
            out.insert(name.clone(), property.codec.encode(value).map_err(|e| e.at(name.as_str()))?);
            if property.required {
                encoded += 1;
            }
        }
        if encoded != self.schema.required {
            return Err(self.schema.missing(|name| x.contains_key(name)));
        }
        Ok(OutJson::Object(out))
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        self.schema.properties.values().map(|p| p.codec.as_node()).collect()
    }
}

/// An object codec together with its property table, so it can be narrowed with
/// [`ObjectCodec::omit`].
#[derive(Clone)]
pub struct ObjectCodec {
    codec: Codec<Record>,
    schema: Arc<ObjectSchema>,
}

impl ObjectCodec {
    pub fn new(properties: IndexMap<String, PropertyCodec>) -> Self {
        let schema = Arc::new(ObjectSchema::new(properties));
        let codec = Codec::new(ObjectCodecImpl { schema: schema.clone() });
        ObjectCodec { codec, schema }
    }

    pub fn schema(&self) -> &ObjectSchema {
        &self.schema
    }

    pub fn codec(&self) -> &Codec<Record> {
        &self.codec
    }

    /// A new object codec without the named properties. With no names, this codec.
    pub fn omit(&self, names: &[&str]) -> ObjectCodec {
        if names.is_empty() {
            return self.clone();
        }
        let kept = self
            .schema
            .properties
            .iter()
            .filter(|(name, _)| !names.contains(&name.as_str()))
            .map(|(name, p)| (name.clone(), p.clone()))
            .collect();
        ObjectCodec::new(kept)
    }
}

impl Deref for ObjectCodec {
    type Target = Codec<Record>;

    fn deref(&self) -> &Codec<Record> {
        &self.codec
    }
}

impl AsRef<Codec<Record>> for ObjectCodec {
    fn as_ref(&self) -> &Codec<Record> {
        &self.codec
    }
}

impl From<ObjectCodec> for Codec<Record> {
    fn from(object: ObjectCodec) -> Self {
        object.codec
    }
}

impl From<ObjectCodec> for Codec<Value> {
    fn from(object: ObjectCodec) -> Self {
        object.codec.erased()
    }
}

// ----- Builder -----

#[derive(Default)]
pub struct ObjectBuilder {
    properties: IndexMap<String, PropertyCodec>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        ObjectBuilder::default()
    }

    /// Declare a property. A repeated name replaces the earlier declaration.
    pub fn field(mut self, name: impl Into<String>, property: impl IntoProperty) -> Self {
        self.properties.insert(name.into(), property.into_property());
        self
    }

    pub fn build(self) -> ObjectCodec {
        ObjectCodec::new(self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::check_both_strategies;
    use crate::codecs;
    use crate::dynamic::record;

    fn status() -> ObjectCodec {
        codecs::object()
            .field("status", codecs::boolean())
            .field("error", codecs::string().optional())
            .build()
    }

    #[test]
    fn optional_property_may_be_absent() {
        check_both_strategies(status().codec(), |codec| {
            assert_eq!(codec.parse(r#"{"status":true}"#).unwrap(), record([("status", true)]));
            let failed = codec.parse(r#"{"status":false,"error":"nope"}"#).unwrap();
            assert_eq!(failed["error"], Value::from("nope"));
            assert_eq!(codec.stringify(&failed).unwrap(), r#"{"status":false,"error":"nope"}"#);
        });
    }

    #[test]
    fn closed_schema_rejects_unknown_and_missing() {
        let codec = status();
        let err = codec.parse(r#"{"status":true,"extra":1}"#).unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedProperty(ref name) if name == "extra"));
        let err = codec.parse(r#"{"error":"x"}"#).unwrap_err();
        assert!(matches!(err, CodecError::MissingProperties(ref names) if names == &["status"]));
        assert!(codec.parse(r#"{"status":"true"}"#).is_err());
        assert!(codec.parse("[]").is_err());
    }

    #[test]
    fn encode_is_symmetric() {
        let codec = status();
        let unknown = record([("status", Value::Bool(true)), ("extra", Value::Null)]);
        assert!(matches!(codec.stringify(&unknown).unwrap_err(), CodecError::UnexpectedProperty(_)));
        let missing = record([("error", "x".to_string())]);
        assert!(matches!(codec.stringify(&missing).unwrap_err(), CodecError::MissingProperties(_)));
    }

    #[test]
    fn decoded_keys_keep_source_order() {
        let codec = codecs::object()
            .field("a", codecs::number())
            .field("b", codecs::number())
            .build();
        check_both_strategies(codec.codec(), |codec| {
            let x = codec.parse(r#"{"b":1,"a":2}"#).unwrap();
            assert_eq!(x.keys().collect::<Vec<_>>(), ["b", "a"]);
            assert_eq!(codec.stringify(&x).unwrap(), r#"{"b":1,"a":2}"#);
        });
    }

    #[test]
    fn property_errors_carry_name() {
        let nested = codecs::object()
            .field("inner", codecs::object().field("n", codecs::number()).build())
            .build();
        let err = nested.parse(r#"{"inner":{"n":"1"}}"#).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "$.inner.n");
    }

    #[test]
    fn omit_removes_properties() {
        let codec = codecs::object()
            .field("a", codecs::string())
            .field("b", codecs::number())
            .field("c", codecs::boolean().optional())
            .build();
        let same = codec.omit(&[]);
        assert!(Codec::ptr_eq(same.codec(), codec.codec()));

        let narrowed = codec.omit(&["a"]);
        assert_eq!(narrowed.schema().properties().keys().collect::<Vec<_>>(), ["b", "c"]);
        assert!(!narrowed.schema().properties()["c"].required);
        assert_eq!(narrowed.parse(r#"{"b":1}"#).unwrap(), record([("b", 1.0)]));
        assert!(narrowed.parse(r#"{"a":"x","b":1}"#).is_err());
    }

    #[test]
    fn empty_object() {
        let empty = codecs::object().build();
        assert_eq!(empty.parse("{}").unwrap(), Record::new());
        assert_eq!(empty.stringify(&Record::new()).unwrap(), "{}");
        assert!(empty.parse(r#"{"a":null}"#).is_err());
    }
}
