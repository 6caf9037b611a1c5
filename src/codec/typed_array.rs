//! Packed numeric arrays with fixed-width elements.
//!
//! Element conversion follows typed-array storage rules: integers truncate toward zero
//! and wrap modulo 2^bits, non-finite inputs store 0, `f32` rounds to nearest. The 64-bit
//! integer variants read each numeral's exact source text and keep its low 64 bits.
use std::marker::PhantomData;

use num_bigint::{BigInt, Sign};

use super::primitive::exact_integer;
use super::JsonCodec;
use crate::error::{CodecError, Result};
use crate::json::{JsonKind, OutJson, SafeJson, UnsafeJson};

pub trait PackedElement: Copy + Send + Sync + 'static {
    fn pack(x: f64) -> Self;
    fn unpack(self) -> f64;
}

// Truncate then reduce modulo 2^bits into [0, 2^bits).
fn wrap(x: f64, bits: i32) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    x.trunc().rem_euclid(2f64.powi(bits))
}

macro_rules! packed_int {
    ($($t:ty => $unsigned:ty, $bits:expr);* $(;)?) => {$(
        impl PackedElement for $t {
            fn pack(x: f64) -> Self {
                wrap(x, $bits) as $unsigned as $t
            }
            fn unpack(self) -> f64 {
                self as f64
            }
        }
    )*};
}

packed_int! {
    i8 => u8, 8;
    i16 => u16, 16;
    i32 => u32, 32;
    u8 => u8, 8;
    u16 => u16, 16;
    u32 => u32, 32;
}

impl PackedElement for f32 {
    fn pack(x: f64) -> Self {
        x as f32
    }
    fn unpack(self) -> f64 {
        self as f64
    }
}

impl PackedElement for f64 {
    fn pack(x: f64) -> Self {
        x
    }
    fn unpack(self) -> f64 {
        self
    }
}

pub struct TypedArrayCodec<N> {
    _element: PhantomData<fn() -> N>,
}

impl<N> TypedArrayCodec<N> {
    pub const fn new() -> Self {
        TypedArrayCodec { _element: PhantomData }
    }
}

impl<N> Default for TypedArrayCodec<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: PackedElement> JsonCodec<Vec<N>> for TypedArrayCodec<N> {
    fn decode(&self, src: &SafeJson) -> Result<Vec<N>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        xs.iter()
            .enumerate()
            .map(|(i, x)| match x.as_number() {
                Some(n) => Ok(N::pack(n.value)),
                None => Err(CodecError::expected(JsonKind::Number, x.kind()).at(i)),
            })
            .collect()
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Vec<N>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        xs.iter()
            .enumerate()
            .map(|(i, x)| match x.as_number() {
                Some(n) => Ok(N::pack(n)),
                None => Err(CodecError::expected(JsonKind::Number, x.kind()).at(i)),
            })
            .collect()
    }

    fn encode(&self, xs: &Vec<N>) -> Result<OutJson> {
        Ok(OutJson::Array(xs.iter().map(|x| OutJson::Number(x.unpack())).collect()))
    }
}

// ----- 64-bit integers -----

pub trait WideElement: Copy + Send + Sync + 'static {
    fn from_low_bits(bits: u64) -> Self;
    fn widen(self) -> BigInt;
}

impl WideElement for i64 {
    fn from_low_bits(bits: u64) -> Self {
        bits as i64
    }
    fn widen(self) -> BigInt {
        BigInt::from(self)
    }
}

impl WideElement for u64 {
    fn from_low_bits(bits: u64) -> Self {
        bits
    }
    fn widen(self) -> BigInt {
        BigInt::from(self)
    }
}

/// Two's-complement low 64 bits of `n`.
fn low_64_bits(n: &BigInt) -> u64 {
    let (sign, digits) = n.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0);
    if sign == Sign::Minus { low.wrapping_neg() } else { low }
}

pub struct WideArrayCodec<N> {
    _element: PhantomData<fn() -> N>,
}

impl<N> WideArrayCodec<N> {
    pub const fn new() -> Self {
        WideArrayCodec { _element: PhantomData }
    }
}

impl<N> Default for WideArrayCodec<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: WideElement> JsonCodec<Vec<N>> for WideArrayCodec<N> {
    fn decode(&self, src: &SafeJson) -> Result<Vec<N>> {
        let xs = src.as_array().ok_or_else(|| CodecError::expected(JsonKind::Array, src.kind()))?;
        xs.iter()
            .enumerate()
            .map(|(i, x)| {
                let n = x.as_number().ok_or_else(|| CodecError::expected(JsonKind::Number, x.kind()));
                n.and_then(exact_integer)
                    .map(|n| N::from_low_bits(low_64_bits(&n)))
                    .map_err(|e| e.at(i))
            })
            .collect()
    }

    fn decode_unsafe(&self, _: &UnsafeJson) -> Result<Vec<N>> {
        Err(CodecError::RequiresExactNumbers("64-bit integer array"))
    }

    fn encode(&self, xs: &Vec<N>) -> Result<OutJson> {
        Ok(OutJson::Array(xs.iter().map(|x| OutJson::ExactInteger(x.widen().to_string())).collect()))
    }

    fn self_requires_exact(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::check_both_strategies;
    use crate::codecs;

    #[test]
    fn integers_wrap_and_truncate() {
        check_both_strategies(&codecs::uint8_array(), |codec| {
            assert_eq!(codec.parse("[0, 255, 256, -1, 1.9, -1.9]").unwrap(), vec![0, 255, 0, 255, 1, 255]);
            assert_eq!(codec.stringify(&vec![1, 2, 3]).unwrap(), "[1,2,3]");
        });
        check_both_strategies(&codecs::int8_array(), |codec| {
            assert_eq!(codec.parse("[127, 128, -129, -1]").unwrap(), vec![127, -128, 127, -1]);
        });
        check_both_strategies(&codecs::int32_array(), |codec| {
            assert_eq!(codec.parse("[2147483648, 4294967297]").unwrap(), vec![i32::MIN, 1]);
        });
        check_both_strategies(&codecs::uint16_array(), |codec| {
            assert_eq!(codec.parse("[65536, 65537, 1e300]").unwrap(), vec![0, 1, 0]);
        });
    }

    #[test]
    fn non_finite_values_store_zero() {
        assert_eq!(i16::pack(f64::NAN), 0);
        assert_eq!(u32::pack(f64::INFINITY), 0);
        assert_eq!(i32::pack(f64::NEG_INFINITY), 0);
        assert!(f32::pack(f64::NAN).is_nan());
    }

    #[test]
    fn floats() {
        check_both_strategies(&codecs::float32_array(), |codec| {
            assert_eq!(codec.parse("[0.1, 1.5]").unwrap(), vec![0.1f32, 1.5]);
            assert_eq!(codec.stringify(&vec![1.5f32, -2.0]).unwrap(), "[1.5,-2]");
        });
        check_both_strategies(&codecs::float64_array(), |codec| {
            assert_eq!(codec.parse("[0.1, 1e-300]").unwrap(), vec![0.1, 1e-300]);
        });
    }

    #[test]
    fn elements_must_be_numbers() {
        let err = codecs::float64_array().parse(r#"[1, "2"]"#).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "$[1]");
        assert!(codecs::int16_array().parse("{}").is_err());
    }

    #[test]
    fn wide_arrays_keep_exact_values() {
        let codec = codecs::bigint64_array();
        assert!(codec.requires_exact());
        let text = "[9223372036854775807,-9223372036854775808,0]";
        let xs = codec.parse(text).unwrap();
        assert_eq!(xs, vec![i64::MAX, i64::MIN, 0]);
        assert_eq!(codec.stringify(&xs).unwrap(), text);

        let unsigned = codecs::biguint64_array();
        let xs = unsigned.parse("[18446744073709551615, 18446744073709551616, -1]").unwrap();
        assert_eq!(xs, vec![u64::MAX, 0, u64::MAX]);
        assert_eq!(unsigned.stringify(&vec![u64::MAX]).unwrap(), "[18446744073709551615]");
    }

    #[test]
    fn wide_arrays_wrap_signed() {
        let xs = codecs::bigint64_array().parse("[9223372036854775808, -9223372036854775809]").unwrap();
        assert_eq!(xs, vec![i64::MIN, i64::MAX]);
    }

    #[test]
    fn wide_arrays_refuse_unsafe_and_fractions() {
        let codec = codecs::bigint64_array();
        let tree = crate::json::parse_unsafe("[1]").unwrap();
        assert!(matches!(codec.decode_unsafe(&tree).unwrap_err(), CodecError::RequiresExactNumbers(_)));
        let err = codec.parse("[1, 2.5]").unwrap_err();
        assert!(matches!(err.root_cause(), CodecError::NotAnInteger(_)));
        assert_eq!(err.path().unwrap().to_string(), "$[1]");
    }
}
