use serde::de::DeserializeOwned;

use crate::error::{CodecError, Result};

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(annotate)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(annotate)
}

fn annotate(err: serde_path_to_error::Error<serde_json::Error>) -> CodecError {
    let path = err.path().to_string();
    let inner = err.into_inner();
    if inner.is_syntax() || inner.is_eof() {
        return CodecError::Lexical(inner);
    }
    CodecError::InvalidSchema(format!("at JSON path {path} → {inner}"))
}
