//! The standard codec catalog.
//!
//! Stateless codecs are process-wide singletons, so `codecs::number()` returns the same
//! instance on every call and derived codecs (e.g. `number().nullable()`) are shared too.
use num_bigint::BigInt;
use once_cell::sync::Lazy;

use crate::codec::discriminated::DiscriminatedBuilder;
use crate::codec::enumeration::EnumCodec;
use crate::codec::object::ObjectBuilder;
use crate::codec::primitive::{BigIntCodec, BooleanCodec, NumberCodec, StringCodec};
use crate::codec::typed_array::{TypedArrayCodec, WideArrayCodec};
use crate::codec::union::UnionCodec;
use crate::codec::{Codec, array::ArrayCodec, tuple::TupleCodec};
use crate::dynamic::{Literal, Value};
use crate::error::Result;
use crate::uuid::{Uuid, uuid_codec};

static NUMBER: Lazy<Codec<f64>> = Lazy::new(|| Codec::new(NumberCodec));
static BIGINT: Lazy<Codec<BigInt>> = Lazy::new(|| Codec::new(BigIntCodec));
static STRING: Lazy<Codec<String>> = Lazy::new(|| Codec::new(StringCodec));
static BOOLEAN: Lazy<Codec<bool>> = Lazy::new(|| Codec::new(BooleanCodec));
static UUID: Lazy<Codec<Uuid>> = Lazy::new(|| uuid_codec(&STRING));

pub fn number() -> Codec<f64> {
    NUMBER.clone()
}

pub fn bigint() -> Codec<BigInt> {
    BIGINT.clone()
}

pub fn string() -> Codec<String> {
    STRING.clone()
}

pub fn boolean() -> Codec<bool> {
    BOOLEAN.clone()
}

pub fn uuid() -> Codec<Uuid> {
    UUID.clone()
}

pub fn literal(value: impl Into<Literal>) -> Codec<Literal> {
    crate::codec::literal::literal(value)
}

/// Members paired with their wire literals, which must be strings or numbers.
pub fn enumeration<E>(members: impl IntoIterator<Item = (E, Literal)>) -> Result<Codec<E>>
where
    E: Clone + PartialEq + std::fmt::Debug + Send + Sync + 'static,
{
    Ok(EnumCodec::new(members)?.build())
}

pub fn tuple(items: impl IntoIterator<Item = Codec<Value>>) -> Codec<Vec<Value>> {
    Codec::new(TupleCodec::new(items.into_iter().collect()))
}

pub fn array<T: 'static>(item: &Codec<T>) -> Codec<Vec<T>> {
    Codec::new(ArrayCodec::new(item.clone()))
}

pub fn object() -> ObjectBuilder {
    ObjectBuilder::new()
}

pub fn discriminated(discriminator: impl Into<String>) -> DiscriminatedBuilder {
    DiscriminatedBuilder::new(discriminator)
}

pub fn union<T: 'static>(options: impl IntoIterator<Item = Codec<T>>) -> Codec<T> {
    Codec::new(UnionCodec::new(options.into_iter().collect()))
}

pub fn lazy<T, F>(factory: F) -> Codec<T>
where
    T: 'static,
    F: Fn() -> Codec<T> + Send + Sync + 'static,
{
    Codec::lazy(factory)
}

/// A codec that refers to itself, e.g. a tree whose children are trees.
pub fn recursive<T, F>(build: F) -> Codec<T>
where
    T: 'static,
    F: Fn(&Codec<T>) -> Codec<T> + Send + Sync + 'static,
{
    Codec::recursive(build)
}

// ----- Typed arrays -----

macro_rules! packed_arrays {
    ($($name:ident, $static:ident: $codec:ident<$t:ty>;)*) => {$(
        static $static: Lazy<Codec<Vec<$t>>> = Lazy::new(|| Codec::new($codec::<$t>::new()));

        pub fn $name() -> Codec<Vec<$t>> {
            $static.clone()
        }
    )*};
}

packed_arrays! {
    int8_array, INT8_ARRAY: TypedArrayCodec<i8>;
    int16_array, INT16_ARRAY: TypedArrayCodec<i16>;
    int32_array, INT32_ARRAY: TypedArrayCodec<i32>;
    uint8_array, UINT8_ARRAY: TypedArrayCodec<u8>;
    uint16_array, UINT16_ARRAY: TypedArrayCodec<u16>;
    uint32_array, UINT32_ARRAY: TypedArrayCodec<u32>;
    float32_array, FLOAT32_ARRAY: TypedArrayCodec<f32>;
    float64_array, FLOAT64_ARRAY: TypedArrayCodec<f64>;
    bigint64_array, BIGINT64_ARRAY: WideArrayCodec<i64>;
    biguint64_array, BIGUINT64_ARRAY: WideArrayCodec<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_are_shared() {
        assert!(Codec::ptr_eq(&number(), &number()));
        assert!(Codec::ptr_eq(&string().nullable(), &string().nullable()));
        assert!(Codec::ptr_eq(&uint8_array(), &uint8_array()));
        assert!(!Codec::ptr_eq(&literal("a"), &literal("a")));
    }

    #[test]
    fn only_exact_codecs_require_exact_numbers() {
        assert!(!number().requires_exact());
        assert!(!string().requires_exact());
        assert!(!uuid().requires_exact());
        assert!(!float64_array().requires_exact());
        assert!(bigint().requires_exact());
        assert!(biguint64_array().requires_exact());
        assert!(literal(BigInt::from(1)).requires_exact());
        assert!(!literal(1).requires_exact());
    }

    #[test]
    fn lazy_codecs_see_later_statics() {
        static NODE: Lazy<Codec<Value>> = Lazy::new(|| {
            object()
                .field("name", string())
                .field("children", array(&lazy(|| NODE.clone())).erased())
                .build()
                .into()
        });
        let tree = NODE.parse(r#"{"name":"root","children":[{"name":"leaf","children":[]}]}"#).unwrap();
        let children = tree.get("children").unwrap();
        assert!(matches!(children, Value::Array(xs) if xs.len() == 1));
        assert!(!NODE.requires_exact());
    }
}
