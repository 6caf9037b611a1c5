use super::{Codec, CodecRef, JsonCodec};
use crate::dynamic::Value;
use crate::error::{CodecError, Result};
use crate::json::{JsonKind, OutJson, SafeJson, UnsafeJson};

/// Fixed-length arrays with one codec per position.
pub struct TupleCodec {
    items: Vec<Codec<Value>>,
}

impl TupleCodec {
    pub fn new(items: Vec<Codec<Value>>) -> Self {
        TupleCodec { items }
    }

    fn check_length(&self, found: usize) -> Result<()> {
        if found == self.items.len() {
            Ok(())
        } else {
            Err(CodecError::WrongLength { expected: self.items.len(), found })
        }
    }
}

impl JsonCodec<Vec<Value>> for TupleCodec {
    fn decode(&self, src: &SafeJson) -> Result<Vec<Value>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        self.check_length(xs.len())?;
        self.items
            .iter()
            .zip(xs)
            .enumerate()
            .map(|(i, (codec, x))| codec.decode(x).map_err(|e| e.at(i)))
            .collect()
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Vec<Value>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        self.check_length(xs.len())?;
        self.items
            .iter()
            .zip(xs)
            .enumerate()
            .map(|(i, (codec, x))| codec.decode_unsafe(x).map_err(|e| e.at(i)))
            .collect()
    }

    fn encode(&self, xs: &Vec<Value>) -> Result<OutJson> {
        self.check_length(xs.len())?;
        self.items
            .iter()
            .zip(xs)
            .enumerate()
            .map(|(i, (codec, x))| codec.encode(x).map_err(|e| e.at(i)))
            .collect::<Result<Vec<_>>>()
            .map(OutJson::Array)
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        self.items.iter().map(Codec::as_node).collect()
    }
}
