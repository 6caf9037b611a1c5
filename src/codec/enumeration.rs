use std::fmt;

use ordered_float::OrderedFloat;

use super::{Codec, JsonCodec};
use crate::dynamic::Literal;
use crate::error::{CodecError, Result};
use crate::json::{OutJson, SafeJson, UnsafeJson};

/// A closed set of members, each written on the wire as a string or number literal.
pub struct EnumCodec<E> {
    members: Vec<(E, Literal)>,
}

impl<E> EnumCodec<E>
where
    E: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(members: impl IntoIterator<Item = (E, Literal)>) -> Result<Self> {
        let members: Vec<_> = members.into_iter().collect();
        for (member, literal) in &members {
            if !matches!(literal, Literal::String(_) | Literal::Number(_)) {
                return Err(CodecError::InvalidSchema(format!(
                    "enumeration member {member:?} must be a string or number, not {literal}"
                )));
            }
        }
        Ok(EnumCodec { members })
    }

    pub fn build(self) -> Codec<E> {
        Codec::new(self)
    }

    fn member(&self, wire: Literal) -> Result<E> {
        self.members
            .iter()
            .find(|(_, literal)| *literal == wire)
            .map(|(member, _)| member.clone())
            .ok_or_else(|| CodecError::NotEnumMember(wire.to_string()))
    }
}

impl<E> JsonCodec<E> for EnumCodec<E>
where
    E: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
{
    fn decode(&self, src: &SafeJson) -> Result<E> {
        match src {
            SafeJson::String(s) => self.member(Literal::String(s.clone())),
            SafeJson::Number(n) => self.member(Literal::Number(OrderedFloat(n.value))),
            other => Err(CodecError::NotEnumMember(format!("{} value", other.kind()))),
        }
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<E> {
        match src {
            UnsafeJson::String(s) => self.member(Literal::String(s.clone())),
            UnsafeJson::Number(n) => self.member(Literal::Number(OrderedFloat(*n))),
            other => Err(CodecError::NotEnumMember(format!("{} value", other.kind()))),
        }
    }

    fn encode(&self, x: &E) -> Result<OutJson> {
        match self.members.iter().find(|(member, _)| member == x) {
            Some((_, Literal::String(s))) => Ok(OutJson::String(s.clone())),
            Some((_, Literal::Number(n))) => Ok(OutJson::Number(n.0)),
            _ => Err(CodecError::NotEnumMember(format!("{x:?}"))),
        }
    }
}
