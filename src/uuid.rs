//! UUID strings in canonical or dashless form, any case.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::codec::{Branded, Codec};
use crate::error::{CodecError, Result};

pub struct UuidBrand;

pub type Uuid = Branded<String, UuidBrand>;

static UUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}(?:-?[0-9a-f]{4}){3}-?[0-9a-f]{12}$").expect("uuid pattern is a valid regex")
});

pub fn is_valid_uuid(s: &str) -> bool {
    UUID_PATTERN.is_match(s)
}

pub fn assert_valid_uuid(s: &str) -> Result<()> {
    if is_valid_uuid(s) {
        Ok(())
    } else {
        Err(CodecError::validation("invalid UUID"))
    }
}

/// Check the text and brand it.
pub fn parse_uuid(s: impl Into<String>) -> Result<Uuid> {
    let s = s.into();
    assert_valid_uuid(&s)?;
    Ok(Uuid::new(s))
}

pub(crate) fn uuid_codec(string: &Codec<String>) -> Codec<Uuid> {
    string.asserting(|s| assert_valid_uuid(s)).branded::<UuidBrand>()
}
