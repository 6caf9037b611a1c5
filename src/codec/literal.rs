//! Codecs that accept exactly one value.
use num_bigint::BigInt;

use super::primitive::exact_integer;
use super::{Codec, JsonCodec};
use crate::dynamic::Literal;
use crate::error::{CodecError, Result};
use crate::json::{OutJson, SafeJson, UnsafeJson};

/// Pick the literal codec matching the value's kind.
pub fn literal(value: impl Into<Literal>) -> Codec<Literal> {
    match value.into() {
        Literal::Number(n) => Codec::new(LiteralNumberCodec { literal: n.0 }),
        Literal::BigInt(n) => Codec::new(LiteralBigIntCodec { literal: n }),
        other => Codec::new(LiteralOtherCodec { literal: other }),
    }
}

pub struct LiteralNumberCodec {
    literal: f64,
}

impl LiteralNumberCodec {
    fn mismatch(&self) -> CodecError {
        CodecError::LiteralMismatch { expected: Literal::from(self.literal) }
    }

    fn accept(&self, n: Option<f64>) -> Result<Literal> {
        match n {
            Some(n) if n == self.literal => Ok(Literal::from(self.literal)),
            _ => Err(self.mismatch()),
        }
    }
}

impl JsonCodec<Literal> for LiteralNumberCodec {
    fn decode(&self, src: &SafeJson) -> Result<Literal> {
        self.accept(src.as_number().map(|n| n.value))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Literal> {
        self.accept(src.as_number())
    }

    fn encode(&self, x: &Literal) -> Result<OutJson> {
        match x {
            Literal::Number(n) if n.0 == self.literal => Ok(OutJson::Number(self.literal)),
            _ => Err(self.mismatch()),
        }
    }
}

pub struct LiteralBigIntCodec {
    literal: BigInt,
}

impl LiteralBigIntCodec {
    fn mismatch(&self) -> CodecError {
        CodecError::LiteralMismatch { expected: Literal::BigInt(self.literal.clone()) }
    }
}

impl JsonCodec<Literal> for LiteralBigIntCodec {
    fn decode(&self, src: &SafeJson) -> Result<Literal> {
        let number = src.as_number().ok_or_else(|| self.mismatch())?;
        match exact_integer(number) {
            Ok(n) if n == self.literal => Ok(Literal::BigInt(n)),
            _ => Err(self.mismatch()),
        }
    }

    fn decode_unsafe(&self, _: &UnsafeJson) -> Result<Literal> {
        Err(CodecError::RequiresExactNumbers("bigint literal"))
    }

    fn encode(&self, x: &Literal) -> Result<OutJson> {
        match x {
            Literal::BigInt(n) if *n == self.literal => Ok(OutJson::ExactInteger(n.to_string())),
            _ => Err(self.mismatch()),
        }
    }

    fn self_requires_exact(&self) -> bool {
        true
    }
}

/// Strings, booleans and null.
pub struct LiteralOtherCodec {
    literal: Literal,
}

impl LiteralOtherCodec {
    fn mismatch(&self) -> CodecError {
        CodecError::LiteralMismatch { expected: self.literal.clone() }
    }

    fn output(&self) -> OutJson {
        match &self.literal {
            Literal::Bool(b) => OutJson::Bool(*b),
            Literal::String(s) => OutJson::String(s.clone()),
            _ => OutJson::Null,
        }
    }
}

impl JsonCodec<Literal> for LiteralOtherCodec {
    fn decode(&self, src: &SafeJson) -> Result<Literal> {
        let matched = match &self.literal {
            Literal::Null => src.is_null(),
            Literal::Bool(b) => src.as_bool() == Some(*b),
            Literal::String(s) => src.as_str() == Some(s.as_str()),
            Literal::Number(_) | Literal::BigInt(_) => false,
        };
        if matched { Ok(self.literal.clone()) } else { Err(self.mismatch()) }
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<Literal> {
        let matched = match &self.literal {
            Literal::Null => src.is_null(),
            Literal::Bool(b) => src.as_bool() == Some(*b),
            Literal::String(s) => src.as_str() == Some(s.as_str()),
            Literal::Number(_) | Literal::BigInt(_) => false,
        };
        if matched { Ok(self.literal.clone()) } else { Err(self.mismatch()) }
    }

    fn encode(&self, x: &Literal) -> Result<OutJson> {
        if *x == self.literal { Ok(self.output()) } else { Err(self.mismatch()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::testing::check_both_strategies;

    #[test]
    fn string_literal() {
        check_both_strategies(&literal("a"), |codec| {
            assert_eq!(codec.parse(r#""a""#).unwrap(), Literal::from("a"));
            assert_eq!(codec.stringify(&Literal::from("a")).unwrap(), r#""a""#);
            assert!(codec.parse(r#""b""#).is_err());
            assert!(codec.stringify(&Literal::from("b")).is_err());
        });
    }

    #[test]
    fn boolean_and_null_literals() {
        check_both_strategies(&literal(true), |codec| {
            assert_eq!(codec.parse("true").unwrap(), Literal::Bool(true));
            assert!(codec.parse("false").is_err());
            assert!(codec.parse(r#""true""#).is_err());
        });
        check_both_strategies(&literal(()), |codec| {
            assert_eq!(codec.parse("null").unwrap(), Literal::Null);
            assert_eq!(codec.stringify(&Literal::Null).unwrap(), "null");
            assert!(codec.parse("0").is_err());
        });
    }

    #[test]
    fn number_literal_compares_values() {
        check_both_strategies(&literal(2000), |codec| {
            assert_eq!(codec.parse("2000").unwrap(), Literal::from(2000));
            assert_eq!(codec.parse("2e3").unwrap(), Literal::from(2000));
            assert_eq!(codec.stringify(&Literal::from(2000.0)).unwrap(), "2000");
            assert!(codec.parse("2001").is_err());
            assert!(codec.parse(r#""2000""#).is_err());
        });
    }

    #[test]
    fn bigint_literal_with_eighty_digits() {
        let text = "249859248759324985924875932498592487593249859248759324985924875932498592487593";
        let value: BigInt = text.parse().unwrap();
        let codec = literal(value.clone());
        assert!(codec.requires_exact());
        assert_eq!(codec.parse(text).unwrap(), Literal::BigInt(value.clone()));
        assert_eq!(codec.stringify(&Literal::BigInt(value)).unwrap(), text);
        // differs only past the 17th significant digit
        let near = "249859248759324985924875932498592487593249859248759324985924875932498592487594";
        assert!(matches!(codec.parse(near).unwrap_err(), CodecError::LiteralMismatch { .. }));
    }

    #[test]
    fn bigint_literal_needs_exact_tree() {
        let codec = literal(BigInt::from(5));
        let tree = crate::json::parse_unsafe("5").unwrap();
        assert!(matches!(codec.decode_unsafe(&tree).unwrap_err(), CodecError::RequiresExactNumbers(_)));
        assert!(codec.stringify(&Literal::from(5)).is_err());
    }
}
