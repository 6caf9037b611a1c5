use super::{Codec, CodecRef, JsonCodec};
use crate::error::{CodecError, Result};
use crate::json::{JsonKind, OutJson, SafeJson, UnsafeJson};

/// Homogeneous arrays: every element through one item codec.
pub struct ArrayCodec<T> {
    item: Codec<T>,
}

impl<T: 'static> ArrayCodec<T> {
    pub fn new(item: Codec<T>) -> Self {
        ArrayCodec { item }
    }
}

impl<T: 'static> JsonCodec<Vec<T>> for ArrayCodec<T> {
    fn decode(&self, src: &SafeJson) -> Result<Vec<T>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        xs.iter()
            .enumerate()
            .map(|(i, x)| self.item.decode(x).map_err(|e| e.at(i)))
            .collect()
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Vec<T>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        xs.iter()
            .enumerate()
            .map(|(i, x)| self.item.decode_unsafe(x).map_err(|e| e.at(i)))
            .collect()
    }

    fn encode(&self, xs: &Vec<T>) -> Result<OutJson> {
        xs.iter()
            .enumerate()
            .map(|(i, x)| self.item.encode(x).map_err(|e| e.at(i)))
            .collect::<Result<Vec<_>>>()
            .map(OutJson::Array)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        vec![self.item.as_node()]
    }
}
