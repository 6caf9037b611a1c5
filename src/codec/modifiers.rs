//! Wrappers that derive a new codec from an existing one.
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use once_cell::sync::OnceCell;

use super::{Codec, CodecRef, JsonCodec};
use crate::dynamic::{CodecValue, Value};
use crate::error::Result;
use crate::json::{OutJson, SafeJson, UnsafeJson};

// ----- Nullable -----

pub struct NullableCodec<T> {
    inner: Codec<T>,
}

impl<T: 'static> NullableCodec<T> {
    pub fn new(inner: Codec<T>) -> Self {
        NullableCodec { inner }
    }
}

impl<T: 'static> JsonCodec<Option<T>> for NullableCodec<T> {
    fn decode(&self, src: &SafeJson) -> Result<Option<T>> {
        if src.is_null() {
            return Ok(None);
        }
        self.inner.decode(src).map(Some)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Option<T>> {
        if src.is_null() {
            return Ok(None);
        }
        self.inner.decode_unsafe(src).map(Some)
    }

    fn encode(&self, x: &Option<T>) -> Result<OutJson> {
        match x {
            None => Ok(OutJson::Null),
            Some(x) => self.inner.encode(x),
        }
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.inner.as_node()]
    }
}

/// Presents a `Codec<Option<Value>>` as a `Codec<Value>`, with `None` as [`Value::Null`].
pub struct FlattenNull {
    nullable: Codec<Option<Value>>,
}

impl FlattenNull {
    pub fn new(nullable: Codec<Option<Value>>) -> Self {
        FlattenNull { nullable }
    }
}

impl JsonCodec<Value> for FlattenNull {
    fn decode(&self, src: &SafeJson) -> Result<Value> {
        Ok(self.nullable.decode(src)?.unwrap_or(Value::Null))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Value> {
        Ok(self.nullable.decode_unsafe(src)?.unwrap_or(Value::Null))
    }

    fn encode(&self, x: &Value) -> Result<OutJson> {
        match x {
            Value::Null => self.nullable.encode(&None),
            other => self.nullable.encode(&Some(other.clone())),
        }
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.nullable.as_node()]
    }
}

// ----- Optional property hint -----

/// Marks an object property that may be absent. Only the object builder consumes it.
pub struct Optional<T> {
    codec: Codec<T>,
}

impl<T> Clone for Optional<T> {
    fn clone(&self) -> Self {
        Optional { codec: self.codec.clone() }
    }
}

impl<T: 'static> Optional<T> {
    pub(crate) fn new(codec: Codec<T>) -> Self {
        Optional { codec }
    }

    pub fn codec(&self) -> &Codec<T> {
        &self.codec
    }

    pub fn same_as(&self, other: &Optional<T>) -> bool {
        Codec::ptr_eq(&self.codec, &other.codec)
    }
}

impl<T> fmt::Debug for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Optional").field(&self.codec).finish()
    }
}

// ----- Mapped -----

pub struct MappedCodec<T, U, F, G> {
    inner: Codec<T>,
    map: F,
    inverse: G,
    _out: PhantomData<fn() -> U>,
}

impl<T, U, F, G> MappedCodec<T, U, F, G> {
    pub fn new(inner: Codec<T>, map: F, inverse: G) -> Self {
        MappedCodec { inner, map, inverse, _out: PhantomData }
    }
}

impl<T, U, F, G> JsonCodec<U> for MappedCodec<T, U, F, G>
where
    T: 'static,
    U: 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
    G: Fn(&U) -> T + Send + Sync + 'static,
{
    fn decode(&self, src: &SafeJson) -> Result<U> {
        self.inner.decode(src).map(&self.map)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<U> {
        self.inner.decode_unsafe(src).map(&self.map)
    }

    fn encode(&self, x: &U) -> Result<OutJson> {
        self.inner.encode(&(self.inverse)(x))
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.inner.as_node()]
    }
}

// ----- Validation -----

pub struct ValidationCodec<T, F> {
    inner: Codec<T>,
    check: F,
}

impl<T, F> ValidationCodec<T, F> {
    pub fn new(inner: Codec<T>, check: F) -> Self {
        ValidationCodec { inner, check }
    }
}

impl<T, F> JsonCodec<T> for ValidationCodec<T, F>
where
    T: 'static,
    F: Fn(&T) -> Result<()> + Send + Sync + 'static,
{
    fn decode(&self, src: &SafeJson) -> Result<T> {
        let x = self.inner.decode(src)?;
        (self.check)(&x)?;
        Ok(x)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<T> {
        let x = self.inner.decode_unsafe(src)?;
        (self.check)(&x)?;
        Ok(x)
    }

    fn encode(&self, x: &T) -> Result<OutJson> {
        (self.check)(x)?;
        self.inner.encode(x)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.inner.as_node()]
    }
}

// ----- Branded -----

/// A `T` tagged with the zero-sized brand `B`.
pub struct Branded<T, B> {
    value: T,
    _brand: PhantomData<fn() -> B>,
}

impl<T, B> Branded<T, B> {
    pub fn new(value: T) -> Self {
        Branded { value, _brand: PhantomData }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T, B> Deref for Branded<T, B> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Clone, B> Clone for Branded<T, B> {
    fn clone(&self) -> Self {
        Branded::new(self.value.clone())
    }
}

impl<T: PartialEq, B> PartialEq for Branded<T, B> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq, B> Eq for Branded<T, B> {}

impl<T: fmt::Debug, B> fmt::Debug for Branded<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: fmt::Display, B> fmt::Display for Branded<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: CodecValue, B: 'static> CodecValue for Branded<T, B> {
    fn into_value(self) -> Value {
        self.value.into_value()
    }
    fn from_value(value: &Value) -> Result<Self> {
        T::from_value(value).map(Branded::new)
    }
}

pub struct BrandedCodec<T, B> {
    inner: Codec<T>,
    _brand: PhantomData<fn() -> B>,
}

impl<T, B> BrandedCodec<T, B> {
    pub fn new(inner: Codec<T>) -> Self {
        BrandedCodec { inner, _brand: PhantomData }
    }
}

impl<T: 'static, B: 'static> JsonCodec<Branded<T, B>> for BrandedCodec<T, B> {
    fn decode(&self, src: &SafeJson) -> Result<Branded<T, B>> {
        self.inner.decode(src).map(Branded::new)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Branded<T, B>> {
        self.inner.decode_unsafe(src).map(Branded::new)
    }

    fn encode(&self, x: &Branded<T, B>) -> Result<OutJson> {
        self.inner.encode(&x.value)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.inner.as_node()]
    }
}

// ----- Lazy -----

type Factory<T> = Box<dyn Fn() -> Result<Codec<T>> + Send + Sync>;

pub struct LazyCodec<T> {
    factory: Factory<T>,
    target: OnceCell<Codec<T>>,
}

impl<T: 'static> LazyCodec<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Codec<T>> + Send + Sync + 'static,
    {
        LazyCodec { factory: Box::new(factory), target: OnceCell::new() }
    }

    fn resolve(&self) -> Result<&Codec<T>> {
        self.target.get_or_try_init(|| {
            tracing::trace!(codec = std::any::type_name::<T>(), "resolving lazy codec");
            (self.factory)()
        })
    }
}

impl<T: 'static> JsonCodec<T> for LazyCodec<T> {
    fn decode(&self, src: &SafeJson) -> Result<T> {
        self.resolve()?.decode(src)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<T> {
        self.resolve()?.decode_unsafe(src)
    }

    fn encode(&self, x: &T) -> Result<OutJson> {
        self.resolve()?.encode(x)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        match self.resolve() {
            Ok(target) => vec![target.as_node()],
            Err(error) => {
                // decoding will surface the same error
                tracing::warn!(%error, "lazy codec failed to resolve during dependency walk");
                Vec::new()
            }
        }
    }

    fn dependencies_settled(&self) -> bool {
        self.target.get().is_some()
    }
}

// ----- Erased -----

pub struct ErasedCodec<T> {
    inner: Codec<T>,
}

impl<T: CodecValue> ErasedCodec<T> {
    pub fn new(inner: Codec<T>) -> Self {
        ErasedCodec { inner }
    }
}

impl<T: CodecValue> JsonCodec<Value> for ErasedCodec<T> {
    fn decode(&self, src: &SafeJson) -> Result<Value> {
        self.inner.decode(src).map(CodecValue::into_value)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Value> {
        self.inner.decode_unsafe(src).map(CodecValue::into_value)
    }

    fn encode(&self, x: &Value) -> Result<OutJson> {
        self.inner.encode(&T::from_value(x)?)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.inner.as_node()]
    }
}

pub struct NarrowedCodec<T> {
    inner: Codec<Value>,
    _out: PhantomData<fn() -> T>,
}

impl<T> NarrowedCodec<T> {
    pub fn new(inner: Codec<Value>) -> Self {
        NarrowedCodec { inner, _out: PhantomData }
    }
}

impl<T: CodecValue + Clone> JsonCodec<T> for NarrowedCodec<T> {
    fn decode(&self, src: &SafeJson) -> Result<T> {
        T::from_value(&self.inner.decode(src)?)
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<T> {
        T::from_value(&self.inner.decode_unsafe(src)?)
    }

    fn encode(&self, x: &T) -> Result<OutJson> {
        self.inner.encode(&x.clone().into_value())
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.inner.as_node()]
    }
}
