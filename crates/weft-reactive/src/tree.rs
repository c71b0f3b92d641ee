#![forbid(unsafe_code)]

//! Deep observation of a data tree.
//!
//! [`observe`] rebuilds a [`Value`] tree as a [`ReactiveNode`]: every
//! mapping, at every depth, becomes a [`ReactiveMap`] that knows its
//! absolute [`KeyPath`] and reports each key lookup and each assignment to
//! a shared [`ChangeSink`]. Scalars and sequences stay plain; they have no
//! keys to intercept.
//!
//! The observed tree is behaviorally transparent: resolving a path against
//! it yields exactly what resolving against the plain tree would, with
//! change events as the only side channel.
//!
//! # Invariants
//!
//! 1. Wrapping preserves shape: `observe(v, sink).snapshot() == v`,
//!    including key order.
//! 2. `Read` events fire before the lookup answer is known; a miss still
//!    emits.
//! 3. `Write` events fire after the new value is installed, exactly one per
//!    assignment.
//! 4. Map-valued payloads are wrapped recursively on assignment, so writes
//!    never create unobserved interior mappings.
//! 5. Event and error paths are absolute, stamped from the root passed to
//!    [`observe`].
//!
//! # Failure Modes
//!
//! | Condition                          | Behavior                                  |
//! |------------------------------------|-------------------------------------------|
//! | Lookup of a missing key            | `Read` emitted, `None` returned           |
//! | Write through a missing parent     | `WriteError::MissingParent`, no `Write`   |
//! | Write through a scalar or sequence | `WriteError::NotAMap`, no `Write`         |
//! | Write addressed at the root path   | `WriteError::EmptyPath`, nothing emitted  |
//! | Sink panics during `emit`          | Propagates to the caller mid-operation    |

use core::fmt;
use std::rc::Rc;

use weft_core::value::IndexMap;
use weft_core::{KeyPath, Resolve, Value, ValueKind, WriteError};

use crate::event::{ChangeEvent, ChangeSink};

/// Wrap `tree` for deep observation, reporting every access to `sink`.
#[must_use]
pub fn observe(tree: Value, sink: Rc<dyn ChangeSink>) -> ReactiveNode {
    wrap(tree, KeyPath::root(), &sink)
}

fn wrap(value: Value, path: KeyPath, sink: &Rc<dyn ChangeSink>) -> ReactiveNode {
    match value {
        Value::Map(entries) => {
            let entries = entries
                .into_iter()
                .map(|(key, child)| {
                    let node = wrap(child, path.child(key.clone()), sink);
                    (key, node)
                })
                .collect();
            ReactiveNode::Map(ReactiveMap {
                path,
                sink: Rc::clone(sink),
                entries,
            })
        }
        leaf => ReactiveNode::Leaf(leaf),
    }
}

// ---------------------------------------------------------------------------
// ReactiveNode
// ---------------------------------------------------------------------------

/// One node of an observed tree.
///
/// Mappings are observed ([`ReactiveMap`]); scalars and sequences pass
/// through as plain leaves.
pub enum ReactiveNode {
    Leaf(Value),
    Map(ReactiveMap),
}

impl ReactiveNode {
    /// The kind of value this node holds.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Leaf(value) => value.kind(),
            Self::Map(_) => ValueKind::Map,
        }
    }

    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&ReactiveMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Leaf(_) => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut ReactiveMap> {
        match self {
            Self::Map(map) => Some(map),
            Self::Leaf(_) => None,
        }
    }

    /// Reconstruct the plain tree under this node.
    ///
    /// Snapshots are silent: bulk reconstruction is not a property access
    /// and emits no events.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        match self {
            Self::Leaf(value) => value.clone(),
            Self::Map(map) => map.snapshot(),
        }
    }

    /// Write `value` at `path` below this node.
    ///
    /// Delegates to [`ReactiveMap::write`]; on a leaf node every non-empty
    /// path fails, since a leaf has no keys to descend through.
    pub fn write(&mut self, path: &KeyPath, value: Value) -> Result<(), WriteError> {
        match self {
            Self::Map(map) => map.write(path, value),
            Self::Leaf(_) => {
                if path.is_root() {
                    Err(WriteError::EmptyPath)
                } else {
                    Err(WriteError::NotAMap(KeyPath::root()))
                }
            }
        }
    }
}

impl Resolve for ReactiveNode {
    /// Resolve `path`, emitting a `Read` per mapping step traversed.
    ///
    /// Same walk as the plain resolver: missing keys yield `None`, and a
    /// scalar or sequence reached early is returned with the remaining
    /// segments ignored.
    fn resolve_path(&self, path: &KeyPath) -> Option<Value> {
        let mut current = self;
        for segment in path.segments() {
            match current {
                ReactiveNode::Map(map) => match map.get(segment.as_str()) {
                    Some(next) => current = next,
                    None => return None,
                },
                ReactiveNode::Leaf(_) => break,
            }
        }
        Some(current.snapshot())
    }
}

impl fmt::Debug for ReactiveNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(value) => f.debug_tuple("Leaf").field(value).finish(),
            Self::Map(map) => map.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// ReactiveMap
// ---------------------------------------------------------------------------

/// An observed mapping: insertion-ordered entries plus the path and sink
/// used to report accesses.
pub struct ReactiveMap {
    path: KeyPath,
    sink: Rc<dyn ChangeSink>,
    entries: IndexMap<String, ReactiveNode>,
}

impl ReactiveMap {
    /// Absolute path of this mapping from the observed root.
    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Look up `key`, emitting a `Read` whether or not it exists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ReactiveNode> {
        self.sink.emit(&ChangeEvent::Read {
            path: self.path.child(key),
        });
        self.entries.get(key)
    }

    /// Insert or replace `key`, emitting a `Write` after the value is in
    /// place.
    ///
    /// A map-valued payload is wrapped recursively first, so later reads
    /// into it are observed like any other mapping.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let path = self.path.child(key.clone());
        let node = wrap(value, path.clone(), &self.sink);
        self.entries.insert(key, node);
        self.sink.emit(&ChangeEvent::Write { path });
    }

    /// Write `value` at a dotted `path` below this mapping.
    ///
    /// Each parent step emits a `Read` before its lookup, then the final
    /// assignment goes through [`ReactiveMap::set`], mirroring how chained
    /// property access reaches an interception-based observer. Parents must
    /// already exist and be mappings; the final segment may be new.
    pub fn write(&mut self, path: &KeyPath, value: Value) -> Result<(), WriteError> {
        let Some((last, parents)) = path.segments().split_last() else {
            return Err(WriteError::EmptyPath);
        };

        let mut current = self;
        for segment in parents {
            let step = current.path.child(segment.clone());
            current.sink.emit(&ChangeEvent::Read { path: step.clone() });
            match current.entries.get_mut(segment.as_str()) {
                Some(ReactiveNode::Map(next)) => current = next,
                Some(ReactiveNode::Leaf(_)) => return Err(WriteError::NotAMap(step)),
                None => return Err(WriteError::MissingParent(step)),
            }
        }
        current.set(last.clone(), value);
        Ok(())
    }

    /// Keys in insertion order. Enumeration is not a property access and
    /// emits nothing.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reconstruct the plain mapping under this node (silent, like
    /// [`ReactiveNode::snapshot`]).
    #[must_use]
    pub fn snapshot(&self) -> Value {
        Value::Map(
            self.entries
                .iter()
                .map(|(key, node)| (key.clone(), node.snapshot()))
                .collect(),
        )
    }
}

impl fmt::Debug for ReactiveMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveMap")
            .field("path", &self.path)
            .field("len", &self.entries.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NullSink, RecordingSink};
    use proptest::prelude::*;

    fn profile() -> Value {
        Value::from_pairs([
            ("name", Value::from("mog")),
            (
                "address",
                Value::from_pairs([
                    ("city", Value::from("Shenzhen")),
                    (
                        "street",
                        Value::from_pairs([("num", Value::from(7)), ("block", Value::from(23))]),
                    ),
                ]),
            ),
            (
                "tags",
                Value::Seq(vec![Value::from("mini"), Value::from("mvvm")]),
            ),
        ])
    }

    fn observed() -> (ReactiveNode, RecordingSink) {
        let sink = RecordingSink::new();
        let tree = observe(profile(), Rc::new(sink.clone()));
        (tree, sink)
    }

    fn path(expr: &str) -> KeyPath {
        KeyPath::parse(expr)
    }

    // ── Wrapping ────────────────────────────────────────────────────

    #[test]
    fn snapshot_reconstructs_the_original_tree() {
        let (tree, _sink) = observed();
        assert_eq!(tree.snapshot(), profile());
    }

    #[test]
    fn wrapping_preserves_key_order() {
        let (tree, _sink) = observed();
        let root = tree.as_map().unwrap();
        let keys: Vec<&str> = root.keys().collect();
        assert_eq!(keys, ["name", "address", "tags"]);
    }

    #[test]
    fn sequences_stay_plain_leaves() {
        let (tree, _sink) = observed();
        let root = tree.as_map().unwrap();
        let tags = root.get("tags").unwrap();
        assert!(!tags.is_map());
        assert_eq!(tags.kind(), ValueKind::Seq);
    }

    #[test]
    fn nodes_know_their_absolute_paths() {
        let (tree, _sink) = observed();
        let root = tree.as_map().unwrap();
        assert!(root.path().is_root());

        let street = root
            .get("address")
            .and_then(ReactiveNode::as_map)
            .and_then(|address| address.get("street"))
            .and_then(ReactiveNode::as_map)
            .unwrap();
        assert_eq!(street.path(), &path("address.street"));
    }

    // ── Read events ─────────────────────────────────────────────────

    #[test]
    fn resolve_emits_a_read_per_step() {
        let (tree, sink) = observed();
        let num = tree.resolve_path(&path("address.street.num"));
        assert_eq!(num, Some(Value::Int(7)));
        assert_eq!(
            sink.reads(),
            vec![
                path("address"),
                path("address.street"),
                path("address.street.num"),
            ]
        );
        assert!(sink.writes().is_empty());
    }

    #[test]
    fn missing_key_still_emits_its_read() {
        let (tree, sink) = observed();
        assert_eq!(tree.resolve_path(&path("ghost")), None);
        assert_eq!(sink.reads(), vec![path("ghost")]);
    }

    #[test]
    fn trailing_segments_past_a_leaf_emit_nothing_further() {
        let (tree, sink) = observed();
        let tags = tree.resolve_path(&path("tags.0"));
        assert_eq!(
            tags,
            Some(Value::Seq(vec![Value::from("mini"), Value::from("mvvm")]))
        );
        assert_eq!(sink.reads(), vec![path("tags")]);
    }

    #[test]
    fn enumeration_is_silent() {
        let (tree, sink) = observed();
        let root = tree.as_map().unwrap();
        let _ = root.keys().count();
        let _ = root.len();
        let _ = tree.snapshot();
        assert!(sink.is_empty());
    }

    // ── Write events ────────────────────────────────────────────────

    #[test]
    fn set_installs_the_value_and_emits_one_write() {
        let (mut tree, sink) = observed();
        let root = tree.as_map_mut().unwrap();
        root.set("name", Value::from("weft"));

        assert_eq!(sink.writes(), vec![path("name")]);
        assert!(sink.reads().is_empty());
        assert_eq!(
            tree.resolve_path(&path("name")),
            Some(Value::from("weft"))
        );
    }

    #[test]
    fn path_addressed_write_reads_each_parent_then_writes_once() {
        let (mut tree, sink) = observed();
        tree.write(&path("address.street.num"), Value::Int(9))
            .unwrap();

        assert_eq!(sink.reads(), vec![path("address"), path("address.street")]);
        assert_eq!(sink.writes(), vec![path("address.street.num")]);
        assert_eq!(
            tree.resolve_path(&path("address.street.num")),
            Some(Value::Int(9))
        );
    }

    #[test]
    fn written_values_are_visible_to_resolution() {
        let plain = Value::from_pairs([("a", Value::from_pairs([("b", Value::from(1))]))]);
        let mut tree = observe(plain, Rc::new(NullSink));
        tree.write(&path("a.b"), Value::Int(2)).unwrap();
        assert_eq!(tree.resolve_path(&path("a.b")), Some(Value::Int(2)));
    }

    #[test]
    fn write_may_introduce_a_new_key() {
        let (mut tree, sink) = observed();
        tree.write(&path("address.zip"), Value::from("518000"))
            .unwrap();

        assert_eq!(sink.writes(), vec![path("address.zip")]);
        let address = tree.resolve_path(&path("address")).unwrap();
        let keys: Vec<&String> = address.as_map().unwrap().keys().collect();
        assert_eq!(keys, ["city", "street", "zip"], "new key appends in order");
    }

    #[test]
    fn map_payloads_are_wrapped_on_assignment() {
        let (mut tree, sink) = observed();
        tree.write(
            &path("address"),
            Value::from_pairs([("city", Value::from("Nanjing"))]),
        )
        .unwrap();
        sink.clear();

        // Reads into the replacement mapping are observed like any other.
        assert_eq!(
            tree.resolve_path(&path("address.city")),
            Some(Value::from("Nanjing"))
        );
        assert_eq!(sink.reads(), vec![path("address"), path("address.city")]);
    }

    // ── Write failures ──────────────────────────────────────────────

    #[test]
    fn write_through_a_missing_parent_fails() {
        let (mut tree, sink) = observed();
        let err = tree
            .write(&path("ghost.num"), Value::Int(1))
            .unwrap_err();
        assert_eq!(err, WriteError::MissingParent(path("ghost")));
        assert_eq!(sink.reads(), vec![path("ghost")], "the step was still read");
        assert!(sink.writes().is_empty());
    }

    #[test]
    fn write_through_a_leaf_fails() {
        let (mut tree, _sink) = observed();
        let err = tree
            .write(&path("name.first"), Value::from("m"))
            .unwrap_err();
        assert_eq!(err, WriteError::NotAMap(path("name")));

        let err = tree
            .write(&path("tags.0"), Value::from("x"))
            .unwrap_err();
        assert_eq!(err, WriteError::NotAMap(path("tags")));
    }

    #[test]
    fn write_at_the_root_path_fails() {
        let (mut tree, sink) = observed();
        let err = tree.write(&KeyPath::root(), Value::Int(1)).unwrap_err();
        assert_eq!(err, WriteError::EmptyPath);
        assert!(sink.is_empty());
    }

    #[test]
    fn leaf_root_rejects_every_write() {
        let mut tree = observe(Value::Int(5), Rc::new(NullSink));
        let err = tree.write(&path("name"), Value::Int(1)).unwrap_err();
        assert_eq!(err, WriteError::NotAMap(KeyPath::root()));
        assert_eq!(err.to_string(), "the tree root is not a mapping");
    }

    // ── Properties ──────────────────────────────────────────────────

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Int),
            "[a-z]{0,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Seq),
                prop::collection::vec(("[a-z]{1,4}", inner), 0..4)
                    .prop_map(|pairs| Value::from_pairs(pairs)),
            ]
        })
    }

    proptest! {
        /// Observation is transparent: any path resolves to the same
        /// answer through the wrapped tree as through the plain one.
        #[test]
        fn wrap_is_transparent(tree in value_strategy(), expr in "[a-z.]{0,12}") {
            let observed = observe(tree.clone(), Rc::new(NullSink));
            let p = KeyPath::parse(&expr);
            prop_assert_eq!(observed.resolve_path(&p), tree.resolve_path(&p));
        }

        /// Wrapping then snapshotting reproduces the tree exactly,
        /// key order included.
        #[test]
        fn snapshot_round_trips(tree in value_strategy()) {
            let observed = observe(tree.clone(), Rc::new(NullSink));
            prop_assert_eq!(observed.snapshot(), tree);
        }

        /// A write that succeeds against the plain tree succeeds against
        /// the observed tree with the same resulting snapshot, and a write
        /// that fails fails with the same error.
        #[test]
        fn writes_match_the_plain_tree(
            tree in value_strategy(),
            expr in "[a-z]{1,4}(\\.[a-z]{1,4}){0,2}",
            payload in -100i64..100,
        ) {
            let p = KeyPath::parse(&expr);
            let mut plain = tree.clone();
            let mut observed = observe(tree, Rc::new(NullSink));

            let plain_result = weft_core::write(&mut plain, &p, Value::Int(payload));
            let observed_result = observed.write(&p, Value::Int(payload));

            prop_assert_eq!(&plain_result, &observed_result);
            if plain_result.is_ok() {
                prop_assert_eq!(observed.snapshot(), plain);
            }
        }
    }
}
