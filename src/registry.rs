//! Named codecs for schema documents.
//!
//! Names are declared before any definition is lowered, so references can be checked
//! eagerly; the codecs themselves are bound once afterwards and looked up lazily, which
//! lets definitions refer to themselves and to each other.
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;

use crate::codec::Codec;
use crate::dynamic::Value;
use crate::error::{CodecError, Result};

#[derive(Default)]
pub struct Registry {
    declared: IndexSet<String>,
    bound: OnceCell<IndexMap<String, Codec<Value>>>,
}

impl Registry {
    pub fn declare<I>(names: I) -> Arc<Registry>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Arc::new(Registry { declared: names.into_iter().map(Into::into).collect(), bound: OnceCell::new() })
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    /// Supply one codec per declared name. Only the first call takes effect.
    pub fn bind(&self, codecs: IndexMap<String, Codec<Value>>) -> Result<()> {
        if let Some(name) = self.declared.iter().find(|name| !codecs.contains_key(name.as_str())) {
            return Err(CodecError::InvalidSchema(format!("definition `{name}` was declared but never bound")));
        }
        if let Some(name) = codecs.keys().find(|name| !self.is_declared(name)) {
            return Err(CodecError::InvalidSchema(format!("definition `{name}` was never declared")));
        }
        self.bound
            .set(codecs)
            .map_err(|_| CodecError::InvalidSchema("registry is already bound".into()))
    }

    pub fn resolve(&self, name: &str) -> Result<Codec<Value>> {
        let bound = self
            .bound
            .get()
            .ok_or_else(|| CodecError::InvalidSchema(format!("definition `{name}` used before binding")))?;
        bound
            .get(name)
            .cloned()
            .ok_or_else(|| CodecError::InvalidSchema(format!("unknown definition `{name}`")))
    }
}
