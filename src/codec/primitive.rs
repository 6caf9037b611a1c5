//! Codecs for the scalar JSON kinds.
use num_bigint::BigInt;
use regex::Regex;

use super::{Codec, JsonCodec};
use crate::error::{CodecError, Result};
use crate::json::{JsonKind, OutJson, SafeJson, SafeNumber, UnsafeJson};

/// Read an exact integer out of a numeral's source text.
pub(crate) fn exact_integer(number: &SafeNumber) -> Result<BigInt> {
    number
        .source
        .parse::<BigInt>()
        .map_err(|_| CodecError::NotAnInteger(number.source.clone()))
}

pub struct NumberCodec;

impl JsonCodec<f64> for NumberCodec {
    fn decode(&self, src: &SafeJson) -> Result<f64> {
        src.as_number()
            .map(|n| n.value)
            .ok_or_else(|| CodecError::expected(JsonKind::Number, src.kind()))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<f64> {
        src.as_number().ok_or_else(|| CodecError::expected(JsonKind::Number, src.kind()))
    }

    fn encode(&self, x: &f64) -> Result<OutJson> {
        Ok(OutJson::Number(*x))
    }
}

pub struct BigIntCodec;

impl JsonCodec<BigInt> for BigIntCodec {
    fn decode(&self, src: &SafeJson) -> Result<BigInt> {
        let number = src.as_number().ok_or_else(|| CodecError::expected(JsonKind::Number, src.kind()))?;
        exact_integer(number)
    }

    fn decode_unsafe(&self, _: &UnsafeJson) -> Result<BigInt> {
        Err(CodecError::RequiresExactNumbers("bigint"))
    }

    fn encode(&self, x: &BigInt) -> Result<OutJson> {
        Ok(OutJson::ExactInteger(x.to_string()))
    }

    fn self_requires_exact(&self) -> bool {
        true
    }
}

pub struct StringCodec;

impl JsonCodec<String> for StringCodec {
    fn decode(&self, src: &SafeJson) -> Result<String> {
        src.as_str()
            .map(str::to_string)
            .ok_or_else(|| CodecError::expected(JsonKind::String, src.kind()))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<String> {
        src.as_str()
            .map(str::to_string)
            .ok_or_else(|| CodecError::expected(JsonKind::String, src.kind()))
    }

    fn encode(&self, x: &String) -> Result<OutJson> {
        Ok(OutJson::String(x.clone()))
    }
}

pub struct BooleanCodec;

impl JsonCodec<bool> for BooleanCodec {
    fn decode(&self, src: &SafeJson) -> Result<bool> {
        src.as_bool().ok_or_else(|| CodecError::expected(JsonKind::Bool, src.kind()))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<bool> {
        src.as_bool().ok_or_else(|| CodecError::expected(JsonKind::Bool, src.kind()))
    }

    fn encode(&self, x: &bool) -> Result<OutJson> {
        Ok(OutJson::Bool(*x))
    }
}

impl Codec<String> {
    /// Strings the pattern matches somewhere; anything else fails validation with
    /// `message`.
    pub fn matching(&self, pattern: Regex, message: impl Into<String>) -> Codec<String> {
        self.validating(move |s| pattern.is_match(s), message)
    }
}
