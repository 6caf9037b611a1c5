use super::{Codec, CodecRef, JsonCodec};
use crate::error::{CodecError, Operation, Result};
use crate::json::{OutJson, SafeJson, UnsafeJson};

/// Ordered alternatives: the first branch that succeeds wins.
pub struct UnionCodec<T> {
    options: Vec<Codec<T>>,
}

impl<T: 'static> UnionCodec<T> {
    pub fn new(options: Vec<Codec<T>>) -> Self {
        UnionCodec { options }
    }

    fn first_success<R>(&self, operation: Operation, attempt: impl Fn(&Codec<T>) -> Result<R>) -> Result<R> {
        for (branch, option) in self.options.iter().enumerate() {
            match attempt(option) {
                Ok(x) => return Ok(x),
                Err(error) => tracing::trace!(branch, %operation, %error, "union branch failed"),
            }
        }
        Err(CodecError::AllBranchesFailed { branches: self.options.len(), operation })
    }
}

impl<T: 'static> JsonCodec<T> for UnionCodec<T> {
    fn decode(&self, src: &SafeJson) -> Result<T> {
        self.first_success(Operation::Decode, |c| c.decode(src))
    }

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<T> {
        self.first_success(Operation::Decode, |c| c.decode_unsafe(src))
    }

    fn encode(&self, x: &T) -> Result<OutJson> {
        self.first_success(Operation::Encode, |c| c.encode(x))
    }

    fn dependencies(&self) -> Vec<CodecRef> {
        self.options.iter().map(Codec::as_node).collect()
    }
}
