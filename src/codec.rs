//! The codec abstraction.
//!
//! A codec is an immutable descriptor that decodes one shape of JSON into a `T` and
//! encodes it back. Implementations provide [`JsonCodec`]; callers hold the shared
//! [`Codec`] handle, which adds the derived codecs, the cached dependency walk and the
//! text entry points.
//!
//! Decoding strategy: a graph that never needs exact integers is lexed into
//! [`UnsafeJson`] (native floats); as soon as any reachable codec reports
//! [`JsonCodec::self_requires_exact`], text is lexed into [`SafeJson`] instead.
pub mod primitive;
pub mod literal;
pub mod modifiers;
pub mod array;
pub mod tuple;
pub mod object;
pub mod enumeration;
pub mod union;
pub mod discriminated;
pub mod typed_array;

use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use crate::dynamic::{CodecValue, Value};
use crate::error::{CodecError, Result};
use crate::json::{self, OutJson, SafeJson, UnsafeJson};

pub use modifiers::{Branded, Optional};

/// Type-erased view of a codec node, used by the dependency walk.
pub type CodecRef = Arc<dyn GraphNode>;

pub trait JsonCodec<T>: Send + Sync + 'static {
    fn decode(&self, src: &SafeJson) -> Result<T>;

    fn decode_unsafe(&self, src: &UnsafeJson) -> Result<T>;

    fn encode(&self, x: &T) -> Result<OutJson>;

    /// Whether this codec alone needs numerals' exact source text.
    fn self_requires_exact(&self) -> bool {
        false
    }

    /// Direct children only; the walk discovers the rest.
    fn dependencies(&self) -> Vec<CodecRef> {
        Vec::new()
    }

    /// False while [`JsonCodec::dependencies`] may still grow, e.g. a lazy codec whose
    /// factory has not succeeded yet.
    fn dependencies_settled(&self) -> bool {
        true
    }
}

pub trait GraphNode: Send + Sync {
    fn self_requires_exact(&self) -> bool;
    fn dependencies(&self) -> Vec<CodecRef>;
    fn dependencies_settled(&self) -> bool;
}

fn node_id(node: &CodecRef) -> usize {
    Arc::as_ptr(node) as *const () as usize
}

/// Depth-first search for any reachable node needing exact numerals. Nodes are tracked
/// by address, so cycles through lazy codecs terminate.
pub fn reaches_exact(root: CodecRef) -> bool {
    explore(root).exact
}

struct Walk {
    exact: bool,
    /// Every visited node had settled dependencies, so a negative answer is final.
    settled: bool,
}

fn explore(root: CodecRef) -> Walk {
    let mut explored = HashSet::new();
    let mut frontier = vec![root];
    let mut settled = true;
    while let Some(next) = frontier.pop() {
        if !explored.insert(node_id(&next)) {
            continue;
        }
        if next.self_requires_exact() {
            tracing::trace!(visited = explored.len(), "exact numerals required");
            return Walk { exact: true, settled: true };
        }
        for dependency in next.dependencies() {
            if !explored.contains(&node_id(&dependency)) {
                frontier.push(dependency);
            }
        }
        settled &= next.dependencies_settled();
    }
    tracing::trace!(visited = explored.len(), settled, "no exact numerals required");
    Walk { exact: false, settled }
}

// ————————————————————————————————————————————————————————————————————————————
// HANDLE
// ————————————————————————————————————————————————————————————————————————————

pub(crate) struct Node<T> {
    imp: Box<dyn JsonCodec<T>>,
    requires_exact: OnceCell<bool>,
    // Holds a `Codec<Option<T>>`; erased because `Node<Option<T>>` would make the type
    // recursive.
    nullable: OnceCell<Box<dyn Any + Send + Sync>>,
    optional: OnceCell<Optional<T>>,
    or_null_of: bool,
}

impl<T: 'static> GraphNode for Node<T> {
    fn self_requires_exact(&self) -> bool {
        self.imp.self_requires_exact()
    }
    fn dependencies(&self) -> Vec<CodecRef> {
        self.imp.dependencies()
    }
    fn dependencies_settled(&self) -> bool {
        self.imp.dependencies_settled()
    }
}

impl<T> Node<T> {
    fn new(imp: Box<dyn JsonCodec<T>>) -> Self {
        Node {
            imp,
            requires_exact: OnceCell::new(),
            nullable: OnceCell::new(),
            optional: OnceCell::new(),
            or_null_of: false,
        }
    }
}

/// Shared handle to a codec. Cloning is cheap and keeps identity.
pub struct Codec<T> {
    node: Arc<Node<T>>,
}

impl<T> Clone for Codec<T> {
    fn clone(&self) -> Self {
        Codec { node: Arc::clone(&self.node) }
    }
}

impl<T> std::fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Codec<{}>@{:p}", std::any::type_name::<T>(), Arc::as_ptr(&self.node))
    }
}

impl<T> AsRef<Codec<T>> for Codec<T> {
    fn as_ref(&self) -> &Codec<T> {
        self
    }
}

impl<T: 'static> Codec<T> {
    pub fn new(imp: impl JsonCodec<T>) -> Self {
        Codec { node: Arc::new(Node::new(Box::new(imp))) }
    }

    pub(crate) fn from_node(node: Arc<Node<T>>) -> Self {
        Codec { node }
    }

    /// Identity comparison.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }

    pub fn as_node(&self) -> CodecRef {
        self.node.clone()
    }

    pub fn decode(&self, src: &SafeJson) -> Result<T> {
        self.node.imp.decode(src)
    }

    pub fn decode_unsafe(&self, src: &UnsafeJson) -> Result<T> {
        self.node.imp.decode_unsafe(src)
    }

    pub fn encode(&self, x: &T) -> Result<OutJson> {
        self.node.imp.encode(x)
    }

    /// Whether this codec or anything reachable from it needs exact numerals. A negative
    /// answer is only cached once every lazy codec on the way has resolved.
    pub fn requires_exact(&self) -> bool {
        if let Some(exact) = self.node.requires_exact.get() {
            return *exact;
        }
        let walk = explore(self.as_node());
        if walk.settled {
            let _ = self.node.requires_exact.set(walk.exact);
        }
        walk.exact
    }

    pub fn parse(&self, text: &str) -> Result<T> {
        self.parse_with(text, false)
    }

    pub fn parse_with(&self, text: &str, force_safe: bool) -> Result<T> {
        if force_safe || self.requires_exact() {
            tracing::debug!(force_safe, "decoding with exact numerals");
            self.decode(&json::parse_safe(text)?)
        } else {
            tracing::debug!("decoding with native floats");
            self.decode_unsafe(&json::parse_unsafe(text)?)
        }
    }

    pub fn stringify(&self, x: &T) -> Result<String> {
        json::to_text(&self.encode(x)?)
    }

    /// Run `check` after every decode and before every encode.
    pub fn asserting<F>(&self, check: F) -> Codec<T>
    where
        F: Fn(&T) -> Result<()> + Send + Sync + 'static,
    {
        Codec::new(modifiers::ValidationCodec::new(self.clone(), check))
    }

    pub fn validating<F>(&self, predicate: F, message: impl Into<String>) -> Codec<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        self.asserting(move |x| {
            if predicate(x) {
                Ok(())
            } else {
                Err(CodecError::Validation(message.clone()))
            }
        })
    }

    /// `null` or `T`. Repeated calls return the same codec.
    pub fn nullable(&self) -> Codec<Option<T>> {
        let cached = self
            .node
            .nullable
            .get_or_init(|| {
                let nullable = Codec::new(modifiers::NullableCodec::new(self.clone()));
                Box::new(nullable) as Box<dyn Any + Send + Sync>
            });
        match cached.downcast_ref::<Codec<Option<T>>>() {
            Some(codec) => codec.clone(),
            None => Codec::new(modifiers::NullableCodec::new(self.clone())),
        }
    }

    /// Mark as an optional object property. Repeated calls return the same hint.
    pub fn optional(&self) -> Optional<T> {
        self.node.optional.get_or_init(|| Optional::new(self.clone())).clone()
    }

    /// Bidirectional transform; `inverse` must undo `map` for round trips to hold.
    pub fn mapped<U, F, G>(&self, map: F, inverse: G) -> Codec<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        G: Fn(&U) -> T + Send + Sync + 'static,
    {
        Codec::new(modifiers::MappedCodec::new(self.clone(), map, inverse))
    }

    /// Type-level tag; no runtime checks are added.
    pub fn branded<B: 'static>(&self) -> Codec<Branded<T, B>> {
        Codec::new(modifiers::BrandedCodec::new(self.clone()))
    }

    /// Defer construction until first use; the factory may name codecs (including this
    /// one) that are only initialized later.
    pub fn lazy<F>(factory: F) -> Codec<T>
    where
        F: Fn() -> Codec<T> + Send + Sync + 'static,
    {
        Codec::try_lazy(move || Ok(factory()))
    }

    pub fn try_lazy<F>(factory: F) -> Codec<T>
    where
        F: Fn() -> Result<Codec<T>> + Send + Sync + 'static,
    {
        Codec::new(modifiers::LazyCodec::new(factory))
    }

    /// A lazy codec whose factory receives the codec itself.
    pub fn recursive<F>(build: F) -> Codec<T>
    where
        F: Fn(&Codec<T>) -> Codec<T> + Send + Sync + 'static,
    {
        let node = Arc::new_cyclic(|me: &Weak<Node<T>>| {
            let me = me.clone();
            let factory = move || match me.upgrade() {
                Some(node) => Ok(build(&Codec::from_node(node))),
                None => Err(CodecError::InvalidSchema("recursive codec used after drop".into())),
            };
            Node::<T>::new(Box::new(modifiers::LazyCodec::new(factory)))
        });
        Codec::from_node(node)
    }
}

impl<T: CodecValue> Codec<T> {
    /// View through the dynamic [`Value`] model, for use inside objects and tuples.
    pub fn erased(&self) -> Codec<Value> {
        if let Some(same) = (self as &dyn Any).downcast_ref::<Codec<Value>>() {
            return same.clone();
        }
        Codec::new(modifiers::ErasedCodec::new(self.clone()))
    }
}

impl Codec<Value> {
    /// Accept `null` alongside this codec's values. Applied to a codec it produced, it
    /// returns that codec unchanged.
    pub fn or_null(&self) -> Codec<Value> {
        if self.node.or_null_of {
            return self.clone();
        }
        let nullable = self.nullable();
        let mut node = Node::<Value>::new(Box::new(modifiers::FlattenNull::new(nullable)));
        node.or_null_of = true;
        Codec::from_node(Arc::new(node))
    }

    /// The typed view of a dynamic codec; decoded values that do not convert fail.
    pub fn narrowed<T: CodecValue + Clone>(&self) -> Codec<T> {
        Codec::new(modifiers::NarrowedCodec::new(self.clone()))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::codecs;
    use crate::dynamic::record;

    #[test]
    fn asserting_checks_both_directions() {
        let codec = codecs::number().asserting(|x| {
            if (0.0..=10.0).contains(x) {
                Ok(())
            } else {
                Err(CodecError::validation("out of range"))
            }
        });
        check_both_strategies(&codec, |codec| {
            assert_eq!(codec.parse("5").unwrap(), 5.0);
            assert_eq!(codec.stringify(&10.0).unwrap(), "10");
            assert!(codec.parse("11").unwrap_err().is_validation());
            assert!(codec.stringify(&500.0).unwrap_err().is_validation());
        });
    }

    #[test]
    fn validating_uses_message() {
        let even = codecs::number().validating(|x| x % 2.0 == 0.0, "must be even");
        let err = even.parse("3").unwrap_err();
        assert_eq!(err.to_string(), "validation failed: must be even");
    }

    #[test]
    fn nullable_is_cached() {
        let string = codecs::string();
        let a = string.nullable();
        let b = string.nullable();
        assert!(Codec::ptr_eq(&a, &b));
        assert_eq!(a.parse("null").unwrap(), None);
        assert_eq!(a.parse(r#""hello world""#).unwrap(), Some("hello world".to_string()));
        assert!(a.parse("").unwrap_err().is_lexical());
    }

    #[test]
    fn repeated_nullable_values_decode() {
        let twice = codecs::number().nullable().nullable();
        assert_eq!(twice.parse("null").unwrap(), None);
        assert_eq!(twice.parse("123").unwrap(), Some(Some(123.0)));
    }

    #[test]
    fn or_null_collapses() {
        let value = codecs::string().erased();
        let once = value.or_null();
        let twice = once.or_null();
        assert!(Codec::ptr_eq(&once, &twice));
        assert_eq!(twice.parse("null").unwrap(), Value::Null);
        assert_eq!(twice.parse(r#""x""#).unwrap(), Value::from("x"));
    }

    #[test]
    fn optional_is_cached() {
        let string = codecs::string();
        assert!(string.optional().same_as(&string.optional()));
    }

    #[test]
    fn mapped_applies_both_directions() {
        let doubled = codecs::number().mapped(|a| a * 2.0, |b| b / 2.0);
        check_both_strategies(&doubled, |codec| {
            assert_eq!(codec.parse("1").unwrap(), 2.0);
            assert_eq!(codec.stringify(&2.0).unwrap(), "1");
        });
    }

    #[test]
    fn branded_changes_nothing_at_runtime() {
        struct Tag;
        let codec = codecs::string().branded::<Tag>();
        check_both_strategies(&codec, |codec| {
            let x = codec.parse(r#""""#).unwrap();
            assert_eq!(x.as_str(), "");
            assert_eq!(codec.stringify(&x).unwrap(), r#""""#);
        });
    }

    #[test]
    fn erased_value_codec_is_identity() {
        let value = codecs::string().erased();
        assert!(Codec::ptr_eq(&value, &value.erased()));
    }

    #[test]
    fn walk_terminates_on_self_cycle() {
        let list = codecs::recursive(|me: &Codec<Value>| {
            codecs::object()
                .field("value", codecs::number())
                .field("next", me.or_null())
                .build()
                .into()
        });
        assert!(!list.requires_exact());
        check_both_strategies(&list, |codec| {
            let decoded = codec.parse(r#"{"value":1,"next":{"value":2,"next":null}}"#).unwrap();
            let inner = record([("value", Value::Number(2.0)), ("next", Value::Null)]);
            let outer = record([("value", Value::Number(1.0)), ("next", Value::Object(inner))]);
            assert_eq!(decoded, Value::Object(outer.clone()));
            assert_eq!(
                codec.stringify(&Value::Object(outer)).unwrap(),
                r#"{"value":1,"next":{"value":2,"next":null}}"#
            );
        });
    }

    #[test]
    fn walk_finds_exact_codec_deep_in_cycle() {
        let tree = codecs::recursive(|me: &Codec<Value>| {
            codecs::object()
                .field("children", codecs::array(me).erased())
                .field("weight", codecs::array(&codecs::bigint().nullable()).erased().optional())
                .build()
                .into()
        });
        assert!(tree.requires_exact());
        let decoded = tree.parse(r#"{"children":[{"children":[],"weight":[null,12345678901234567890123]}]}"#);
        assert!(decoded.is_ok(), "{decoded:?}");
    }

    #[test]
    fn parse_prefers_unsafe_path_without_exact_codecs() {
        // `ForcedSafe` panics in unsafe mode, so wrapping it in a plain array proves the
        // array inherits the safe strategy through the walk.
        let inner = forced_safe(&codecs::number());
        let outer = codecs::array(&inner);
        assert!(outer.requires_exact());
        assert_eq!(outer.parse("[1,2]").unwrap(), vec![1.0, 2.0]);
        assert!(!codecs::array(&codecs::number()).requires_exact());
    }

    #[test]
    fn plain_graphs_decode_from_native_floats() {
        let list = codecs::array(&native_only(&codecs::number()));
        assert!(!list.requires_exact());
        assert_eq!(list.parse("[1,2]").unwrap(), vec![1.0, 2.0]);

        let wrapped = codecs::object().field("xs", list).field("n", native_only(&codecs::number())).build();
        let value = wrapped.parse(r#"{"xs":[3],"n":4}"#).unwrap();
        assert_eq!(wrapped.stringify(&value).unwrap(), r#"{"xs":[3],"n":4}"#);

        // forcing the safe path reaches the panicking decode
        let forced = std::panic::catch_unwind(|| codecs::array(&native_only(&codecs::number())).parse_with("[1]", true));
        assert!(forced.is_err());
    }

    #[test]
    fn unresolved_lazy_codecs_do_not_settle_the_strategy() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let ready = Arc::new(AtomicBool::new(false));
        let flag = ready.clone();
        let late: Codec<num_bigint::BigInt> = Codec::try_lazy(move || {
            if flag.load(Ordering::SeqCst) {
                Ok(codecs::bigint())
            } else {
                Err(CodecError::InvalidSchema("not bound yet".into()))
            }
        });
        let list = codecs::array(&late);
        assert!(!list.requires_exact());

        ready.store(true, Ordering::SeqCst);
        assert!(list.requires_exact());
        let big = "[123456789012345678901234567890]";
        assert_eq!(list.stringify(&list.parse(big).unwrap()).unwrap(), big);
    }
}
