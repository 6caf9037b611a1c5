//! Schema-driven JSON codecs.
//!
//! Codecs are composable descriptors that decode wire text into typed values and encode
//! them back, rejecting anything that does not fit. Numeric precision is never lost
//! silently: a codec graph that contains any exact-integer codec is decoded from a tree
//! that keeps every numeral's source text.
//!
//! ```
//! use json_codec::codecs;
//!
//! let point = codecs::object()
//!     .field("x", codecs::number())
//!     .field("y", codecs::number())
//!     .field("label", codecs::string().optional())
//!     .build();
//!
//! let p = point.parse(r#"{"x": 1, "y": 2.5}"#).unwrap();
//! assert_eq!(point.stringify(&p).unwrap(), r#"{"x":1,"y":2.5}"#);
//! ```
pub mod error;
pub mod json;
pub mod dynamic;
pub mod codec;
pub mod codecs;
pub mod uuid;
pub mod schema;
pub mod registry;
pub mod lower;
pub mod path_de;

pub use codec::object::ObjectCodec;
pub use codec::{Branded, Codec, JsonCodec, Optional};
pub use dynamic::{CodecValue, Literal, Record, Value};
pub use error::{CodecError, Result};
pub use json::{OutJson, SafeJson, UnsafeJson};
pub use lower::lower_document;
pub use schema::{Schema, SchemaDocument};
