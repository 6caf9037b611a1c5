//! Schema documents → codec graphs.
use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use num_bigint::BigInt;
use regex::Regex;

use crate::codec::object::{ObjectBuilder, PropertyCodec};
use crate::codec::Codec;
use crate::codecs;
use crate::dynamic::{CodecValue, Literal, Record, Value};
use crate::error::{CodecError, Result};
use crate::json::MAX_SAFE_INTEGER;
use crate::registry::Registry;
use crate::schema::{ElementType, Schema, SchemaDocument, StringFormat};

/// Lower every definition, bind them, then lower the root.
pub fn lower_document(doc: &SchemaDocument) -> Result<Codec<Value>> {
    let registry = Registry::declare(doc.definitions.keys().cloned());
    let mut bound = IndexMap::with_capacity(doc.definitions.len());
    for (name, schema) in &doc.definitions {
        let codec = lower(schema, &registry).map_err(|e| in_definition(name, e))?;
        bound.insert(name.clone(), codec);
    }
    registry.bind(bound)?;
    reject_unguarded_cycles(&doc.definitions)?;
    let root = lower(&doc.root, &registry)?;
    tracing::debug!(
        definitions = doc.definitions.len(),
        requires_exact = root.requires_exact(),
        "lowered schema document"
    );
    Ok(root)
}

fn in_definition(name: &str, err: CodecError) -> CodecError {
    match err {
        CodecError::InvalidSchema(message) => CodecError::InvalidSchema(format!("in definition `{name}`: {message}")),
        other => other,
    }
}

/// A definition that reaches itself through refs, unions, nullables or discriminated
/// variants alone would decode forever without consuming input. Arrays, tuples and
/// objects each step one level into the document, so cycles through them terminate.
fn reject_unguarded_cycles(definitions: &IndexMap<String, Schema>) -> Result<()> {
    let edges = definitions
        .iter()
        .map(|(name, schema)| {
            let mut refs = Vec::new();
            unguarded_refs(schema, &mut refs);
            (name.as_str(), refs)
        })
        .collect::<IndexMap<_, _>>();
    for (start, refs) in &edges {
        let mut seen = HashSet::new();
        let mut stack = refs.clone();
        while let Some(name) = stack.pop() {
            if name == *start {
                return Err(CodecError::InvalidSchema(format!(
                    "definition `{start}` refers to itself without nesting"
                )));
            }
            if seen.insert(name) {
                if let Some(next) = edges.get(name) {
                    stack.extend(next.iter().copied());
                }
            }
        }
    }
    Ok(())
}

fn unguarded_refs<'a>(schema: &'a Schema, out: &mut Vec<&'a str>) {
    match schema {
        Schema::Ref { name } => out.push(name.as_str()),
        Schema::Union { options } => options.iter().for_each(|option| unguarded_refs(option, out)),
        Schema::Nullable { inner } => unguarded_refs(inner, out),
        Schema::Discriminated { variants, .. } => variants.values().for_each(|variant| unguarded_refs(variant, out)),
        _ => {}
    }
}

pub fn lower(schema: &Schema, registry: &Arc<Registry>) -> Result<Codec<Value>> {
    let codec: Codec<Value> = match schema {
        Schema::Null => codecs::literal(()).erased(),
        Schema::Boolean => codecs::boolean().erased(),
        Schema::Number => codecs::number().erased(),
        Schema::Bigint => codecs::bigint().erased(),
        Schema::String { pattern, format } => lower_string(pattern.as_deref(), *format)?,
        Schema::Literal { value, exact } => codecs::literal(literal(value, *exact)?).erased(),
        Schema::Enum { values } => {
            let members = values
                .iter()
                .map(|v| literal(v, false).map(|lit| (lit.clone().into_value(), lit)))
                .collect::<Result<Vec<_>>>()?;
            codecs::enumeration(members)?
        }
        Schema::Array { items } => codecs::array(&lower(items, registry)?).erased(),
        Schema::Tuple { items } => {
            let items = items.iter().map(|s| lower(s, registry)).collect::<Result<Vec<_>>>()?;
            codecs::tuple(items).erased()
        }
        Schema::Object { properties } => {
            let mut builder = ObjectBuilder::new();
            for (name, property) in properties {
                let codec = lower(&property.schema, registry)?;
                builder = builder.field(name.as_str(), PropertyCodec { codec, required: !property.optional });
            }
            builder.build().into()
        }
        Schema::Union { options } => {
            let options = options.iter().map(|s| lower(s, registry)).collect::<Result<Vec<_>>>()?;
            codecs::union(options)
        }
        Schema::Discriminated { discriminator, variants } => {
            let mut builder = codecs::discriminated(discriminator.as_str());
            for (tag, variant) in variants {
                let codec: Codec<Record> = lower(variant, registry)?.narrowed();
                builder = builder.associate(tag.as_str(), codec);
            }
            builder.build().erased()
        }
        Schema::Nullable { inner } => lower(inner, registry)?.or_null(),
        Schema::TypedArray { element } => typed_array(*element),
        Schema::Ref { name } => {
            if !registry.is_declared(name) {
                return Err(CodecError::InvalidSchema(format!("unknown definition `{name}`")));
            }
            let registry = registry.clone();
            let name = name.clone();
            Codec::try_lazy(move || registry.resolve(&name))
        }
    };
    Ok(codec)
}

fn lower_string(pattern: Option<&str>, format: Option<StringFormat>) -> Result<Codec<Value>> {
    let mut codec = codecs::string();
    if let Some(pattern) = pattern {
        let re = Regex::new(pattern)
            .map_err(|e| CodecError::InvalidSchema(format!("invalid pattern {pattern:?}: {e}")))?;
        codec = codec.matching(re, format!("does not match pattern {pattern:?}"));
    }
    match format {
        Some(StringFormat::Uuid) if pattern.is_none() => Ok(codecs::uuid().erased()),
        Some(StringFormat::Uuid) => Ok(codec.asserting(|s| crate::uuid::assert_valid_uuid(s)).erased()),
        None => Ok(codec.erased()),
    }
}

/// Integers beyond the exactly-representable range, or any `exact` integer, become
/// bigint literals.
fn literal(value: &serde_json::Value, exact: bool) -> Result<Literal> {
    match value {
        serde_json::Value::Null => Ok(Literal::Null),
        serde_json::Value::Bool(b) => Ok(Literal::Bool(*b)),
        serde_json::Value::String(s) => Ok(Literal::String(s.clone())),
        serde_json::Value::Number(n) => {
            let source = n.to_string();
            let integer = source.parse::<BigInt>().ok();
            match integer {
                Some(i) if exact || !fits_f64(&i) => Ok(Literal::BigInt(i)),
                None if exact => Err(CodecError::InvalidSchema(format!("exact literal {source} is not an integer"))),
                _ => source
                    .parse::<f64>()
                    .map(Literal::from)
                    .map_err(|e| CodecError::InvalidSchema(format!("bad numeric literal {source}: {e}"))),
            }
        }
        other => Err(CodecError::InvalidSchema(format!("literal must be a scalar, found {other}"))),
    }
}

fn fits_f64(i: &BigInt) -> bool {
    i.magnitude() <= &num_bigint::BigUint::from(MAX_SAFE_INTEGER as u64)
}

fn typed_array(element: ElementType) -> Codec<Value> {
    match element {
        ElementType::Int8 => codecs::int8_array().erased(),
        ElementType::Int16 => codecs::int16_array().erased(),
        ElementType::Int32 => codecs::int32_array().erased(),
        ElementType::Uint8 => codecs::uint8_array().erased(),
        ElementType::Uint16 => codecs::uint16_array().erased(),
        ElementType::Uint32 => codecs::uint32_array().erased(),
        ElementType::Float32 => codecs::float32_array().erased(),
        ElementType::Float64 => codecs::float64_array().erased(),
        ElementType::Bigint64 => codecs::bigint64_array().erased(),
        ElementType::Biguint64 => codecs::biguint64_array().erased(),
    }
}
