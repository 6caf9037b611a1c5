//! Error taxonomy shared by every codec.
//!
//! Three families surface to callers:
//! - lexical: the wire text is not JSON at all ([`CodecError::Lexical`])
//! - structural: a node does not have the shape a codec expects
//! - validation: the shape was fine but a predicate rejected the value
//!
//! Composite codecs wrap child failures in [`CodecError::At`] so the message
//! names the offending node, e.g. `at JSON path $.items[2] → expected number, found string`.
use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

use crate::dynamic::Literal;
use crate::json::JsonKind;

pub type Result<T, E = CodecError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON text: {0}")]
    Lexical(#[from] serde_json::Error),

    #[error("expected {expected}, found {found}")]
    UnexpectedKind { expected: JsonKind, found: JsonKind },

    #[error("expected an array of length {expected}, found length {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("unexpected property `{0}`")]
    UnexpectedProperty(String),

    #[error("missing required properties: {}", .0.join(", "))]
    MissingProperties(Vec<String>),

    #[error("expected literal {expected}")]
    LiteralMismatch { expected: Literal },

    #[error("{0} is not a member of the enumeration")]
    NotEnumMember(String),

    #[error("missing discriminator property `{0}`")]
    MissingDiscriminator(String),

    #[error("unknown value {value} for discriminator `{property}`")]
    UnknownDiscriminator { property: String, value: String },

    #[error("all {branches} union branches failed to {operation}")]
    AllBranchesFailed { branches: usize, operation: Operation },

    #[error("expected an integer numeral, found `{0}`")]
    NotAnInteger(String),

    #[error("{0} cannot be decoded without exact numeric source text")]
    RequiresExactNumbers(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("at JSON path {path} → {source}")]
    At {
        path: JsonPath,
        #[source]
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub fn expected(expected: JsonKind, found: JsonKind) -> Self {
        CodecError::UnexpectedKind { expected, found }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CodecError::Validation(message.into())
    }

    /// Prefix this error with one more path segment (outermost segment last to be added).
    pub fn at(self, segment: impl Into<PathSegment>) -> Self {
        match self {
            CodecError::Lexical(_) => self,
            CodecError::At { mut path, source } => {
                path.0.push_front(segment.into());
                CodecError::At { path, source }
            }
            other => CodecError::At {
                path: JsonPath(VecDeque::from([segment.into()])),
                source: Box::new(other),
            },
        }
    }

    /// The error with any path context removed.
    pub fn root_cause(&self) -> &CodecError {
        match self {
            CodecError::At { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn path(&self) -> Option<&JsonPath> {
        match self {
            CodecError::At { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.root_cause(), CodecError::Lexical(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root_cause(), CodecError::Validation(_))
    }

    /// Structural errors include validation errors, which are a specialization.
    pub fn is_structural(&self) -> bool {
        !matches!(self.root_cause(), CodecError::Lexical(_) | CodecError::InvalidSchema(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Decode,
    Encode,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Decode => f.write_str("decode"),
            Operation::Encode => f.write_str("encode"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON PATH
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPath(VecDeque<PathSegment>);

impl JsonPath {
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.0.iter()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Key(k) if is_plain_key(k) => write!(f, ".{k}")?,
                PathSegment::Key(k) => write!(f, "[{k:?}]")?,
            }
        }
        Ok(())
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !key.starts_with(|c: char| c.is_ascii_digit())
}
