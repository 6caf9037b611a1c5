//! Schema documents: codec graphs described as JSON.
//!
//! ```json
//! {
//!   "root": { "type": "ref", "name": "tree" },
//!   "definitions": {
//!     "tree": {
//!       "type": "object",
//!       "properties": {
//!         "label": { "type": "string" },
//!         "children": { "type": "array", "items": { "type": "ref", "name": "tree" } },
//!         "weight": { "type": "bigint", "optional": true }
//!       }
//!     }
//!   }
//! }
//! ```
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schema {
    Null,
    Boolean,
    Number,
    Bigint,
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<StringFormat>,
    },
    /// `exact` forces a bigint literal even for small integers.
    Literal {
        value: serde_json::Value,
        #[serde(default)]
        exact: bool,
    },
    Enum {
        values: Vec<serde_json::Value>,
    },
    Array {
        items: Box<Schema>,
    },
    Tuple {
        items: Vec<Schema>,
    },
    Object {
        #[serde(default)]
        properties: IndexMap<String, Property>,
    },
    Union {
        options: Vec<Schema>,
    },
    /// Variant keys are the discriminator's string values.
    Discriminated {
        discriminator: String,
        variants: IndexMap<String, Schema>,
    },
    Nullable {
        inner: Box<Schema>,
    },
    TypedArray {
        element: ElementType,
    },
    Ref {
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringFormat {
    Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Int8,
    Int16,
    Int32,
    Uint8,
    Uint16,
    Uint32,
    Float32,
    Float64,
    Bigint64,
    Biguint64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(flatten)]
    pub schema: Schema,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub root: Schema,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
}

impl SchemaDocument {
    pub fn from_json_str(src: &str) -> Result<Self> {
        crate::path_de::from_str_with_path(src)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        crate::path_de::from_slice_with_path(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_nested_document() {
        let src = json!({
            "root": {
                "type": "object",
                "properties": {
                    "id": { "type": "string", "format": "uuid" },
                    "tags": { "type": "array", "items": { "type": "string" }, "optional": true },
                    "kind": { "type": "literal", "value": "user" }
                }
            }
        });
        let doc = SchemaDocument::from_json_str(&src.to_string()).unwrap();
        let Schema::Object { properties } = &doc.root else {
            panic!("expected object, got {:?}", doc.root);
        };
        assert_eq!(properties.keys().collect::<Vec<_>>(), ["id", "tags", "kind"]);
        assert!(properties["tags"].optional);
        assert!(!properties["id"].optional);
        assert_eq!(
            properties["id"].schema,
            Schema::String { pattern: None, format: Some(StringFormat::Uuid) }
        );
        assert!(doc.definitions.is_empty());
    }

    #[test]
    fn typed_arrays_and_refs() {
        let src = r#"{
            "root": { "type": "union", "options": [
                { "type": "typed_array", "element": "biguint64" },
                { "type": "ref", "name": "other" }
            ]},
            "definitions": { "other": { "type": "null" } }
        }"#;
        let doc = SchemaDocument::from_json_str(src).unwrap();
        assert_eq!(
            doc.root,
            Schema::Union {
                options: vec![
                    Schema::TypedArray { element: ElementType::Biguint64 },
                    Schema::Ref { name: "other".into() },
                ]
            }
        );
        assert_eq!(doc.definitions["other"], Schema::Null);
    }

    #[test]
    fn unknown_type_reports_path() {
        let err = SchemaDocument::from_json_str(r#"{"root":{"type":"float"}}"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("at JSON path root"), "{message}");
        assert!(message.contains("float"), "{message}");
    }

    #[test]
    fn malformed_document_is_lexical() {
        assert!(SchemaDocument::from_json_str(r#"{"root":"#).unwrap_err().is_lexical());
    }
}
