//! Unions of object shapes told apart by one shared property.
use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use super::primitive::exact_integer;
use super::{Codec, CodecRef, JsonCodec};
use crate::dynamic::{Literal, Record};
use crate::error::{CodecError, Result};
use crate::json::{JsonKind, OutJson, SafeJson, UnsafeJson};

pub struct DiscriminatedBuilder {
    discriminator: String,
    variants: IndexMap<Literal, Codec<Record>>,
}

impl DiscriminatedBuilder {
    pub fn new(discriminator: impl Into<String>) -> Self {
        DiscriminatedBuilder { discriminator: discriminator.into(), variants: IndexMap::new() }
    }

    /// Route objects whose discriminator equals `value` to `codec`, which decodes the
    /// whole object, discriminator included.
    pub fn associate(mut self, value: impl Into<Literal>, codec: impl AsRef<Codec<Record>>) -> Self {
        self.variants.insert(value.into(), codec.as_ref().clone());
        self
    }

    pub fn build(self) -> Codec<Record> {
        Codec::new(DiscriminatedCodec { discriminator: self.discriminator, variants: self.variants })
    }
}

pub struct DiscriminatedCodec {
    discriminator: String,
    variants: IndexMap<Literal, Codec<Record>>,
}

impl DiscriminatedCodec {
    fn select(&self, key: Option<Literal>, shown: impl FnOnce() -> String) -> Result<&Codec<Record>> {
        key.and_then(|key| self.variants.get(&key)).ok_or_else(|| CodecError::UnknownDiscriminator {
            property: self.discriminator.clone(),
            value: shown(),
        })
    }

    fn missing(&self) -> CodecError {
        CodecError::MissingDiscriminator(self.discriminator.clone())
    }

    fn safe_key(&self, src: &SafeJson) -> Option<Literal> {
        match src {
            SafeJson::Null => Some(Literal::Null),
            SafeJson::Bool(b) => Some(Literal::Bool(*b)),
            SafeJson::String(s) => Some(Literal::String(s.clone())),
            SafeJson::Number(n) => {
                // bigint keys only match an exact numeral
                let exact = exact_integer(n).ok().map(Literal::BigInt);
                match exact {
                    Some(key) if self.variants.contains_key(&key) => Some(key),
                    _ => Some(Literal::Number(OrderedFloat(n.value))),
                }
            }
            SafeJson::Array(_) | SafeJson::Object(_) => None,
        }
    }

    fn unsafe_key(src: &UnsafeJson) -> Option<Literal> {
        match src {
            UnsafeJson::Null => Some(Literal::Null),
            UnsafeJson::Bool(b) => Some(Literal::Bool(*b)),
            UnsafeJson::String(s) => Some(Literal::String(s.clone())),
            UnsafeJson::Number(n) => Some(Literal::Number(OrderedFloat(*n))),
            UnsafeJson::Array(_) | UnsafeJson::Object(_) => None,
        }
    }
}

impl JsonCodec<Record> for DiscriminatedCodec {
    fn decode(&self, src: &SafeJson) -> Result<Record> {
        let object = src.as_object().ok_or_else(|| CodecError::expected(JsonKind::Object, src.kind()))?;
        let tag = object.get(&self.discriminator).ok_or_else(|| self.missing())?;
        let codec = self.select(self.safe_key(tag), || describe_safe(tag))?;
        codec.decode(src)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Record> {
        let object = src.as_object().ok_or_else(|| CodecError::expected(JsonKind::Object, src.kind()))?;
        let tag = object.get(&self.discriminator).ok_or_else(|| self.missing())?;
        let codec = self.select(Self::unsafe_key(tag), || describe_unsafe(tag))?;
        codec.decode_unsafe(src)
    }

    fn encode(&self, x: &Record) -> Result<OutJson> {
        let tag = x.get(&self.discriminator).ok_or_else(|| self.missing())?;
        let key = Literal::from_value(tag);
        let shown = key.as_ref().map_or_else(|| tag.kind().to_string(), Literal::to_string);
        self.select(key, || shown)?.encode(x)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        self.variants.values().map(Codec::as_node).collect()
    }
}

fn describe_safe(tag: &SafeJson) -> String {
    match tag {
        SafeJson::String(s) => format!("{s:?}"),
        SafeJson::Number(n) => n.source.clone(),
        other => other.kind().to_string(),
    }
}

fn describe_unsafe(tag: &UnsafeJson) -> String {
    match tag {
        UnsafeJson::String(s) => format!("{s:?}"),
        UnsafeJson::Number(n) => n.to_string(),
        other => other.kind().to_string(),
    }
}
