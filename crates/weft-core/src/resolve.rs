//! Walking dotted paths against a data tree.
//!
//! Resolution never fails: a missing key yields `None` and the renderer
//! degrades visibly instead of aborting. The write-side companion does
//! fail, with a typed [`WriteError`], but its callers (the mutation
//! gate) convert failures into reported drops rather than surfacing them.
//!
//! # Invariants
//!
//! 1. **Graceful missing path**: `resolve` returns `None` for absent keys
//!    and never panics.
//! 2. **Sequences are opaque leaves**: neither `resolve` nor `write`
//!    descends into a sequence; there are no index paths.
//! 3. **Last reached value**: once the walk lands on a scalar or a
//!    sequence, remaining segments are ignored and that value is returned.
//! 4. **No autovivification**: `write` descends through existing mappings
//!    only; a missing parent is an error, never silently created.

use core::fmt;

use crate::path::KeyPath;
use crate::value::Value;

/// Resolve `path` against `root`, returning a borrow of the reached value.
///
/// The walk steps into a mapping for each segment while segments remain;
/// reaching a scalar or a sequence stops the walk and returns that value,
/// ignoring any remaining segments. A segment that names no key in the
/// current mapping resolves the whole path to `None`.
#[must_use]
pub fn resolve<'a>(root: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.segments() {
        match current {
            Value::Map(entries) => match entries.get(segment.as_str()) {
                Some(next) => current = next,
                None => return None,
            },
            // Scalar or sequence reached: trailing segments are ignored.
            _ => break,
        }
    }
    Some(current)
}

/// Why a path-addressed write could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The root path has no final segment to write to.
    EmptyPath,
    /// A parent step named a key that does not exist (shown with the
    /// full path of the missing step).
    MissingParent(KeyPath),
    /// A step landed on a scalar or sequence instead of a mapping (shown
    /// with the full path of the offending value).
    NotAMap(KeyPath),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "cannot write to the root path"),
            Self::MissingParent(path) => write!(f, "missing parent at '{path}'"),
            Self::NotAMap(path) => {
                if path.is_root() {
                    write!(f, "the tree root is not a mapping")
                } else {
                    write!(f, "value at '{path}' is not a mapping")
                }
            }
        }
    }
}

impl std::error::Error for WriteError {}

/// Write `value` at `path`, descending through existing mappings only.
///
/// The final segment inserts a new key or overwrites an existing one.
/// Parent segments must already exist and be mappings; there is no
/// autovivification, matching assignment through a missing reference in
/// the host-page model this engine serves.
pub fn write(root: &mut Value, path: &KeyPath, value: Value) -> Result<(), WriteError> {
    let Some((last, parents)) = path.segments().split_last() else {
        return Err(WriteError::EmptyPath);
    };

    let mut current = root;
    let mut walked = KeyPath::root();
    for segment in parents {
        let Value::Map(entries) = current else {
            return Err(WriteError::NotAMap(walked));
        };
        walked = walked.child(segment.clone());
        match entries.get_mut(segment.as_str()) {
            Some(next) => current = next,
            None => return Err(WriteError::MissingParent(walked)),
        }
    }

    let Value::Map(entries) = current else {
        return Err(WriteError::NotAMap(walked));
    };
    entries.insert(last.clone(), value);
    Ok(())
}

/// The resolution seam shared by the renderer and the observed tree.
///
/// The plain [`Value`] impl is silent; the reactive impl in
/// `weft-reactive` emits a read notification per mapping step it
/// traverses. Either way the caller receives an owned snapshot of the
/// reached value.
pub trait Resolve {
    /// Resolve `path`, returning an owned snapshot of the reached value.
    fn resolve_path(&self, path: &KeyPath) -> Option<Value>;
}

impl Resolve for Value {
    fn resolve_path(&self, path: &KeyPath) -> Option<Value> {
        resolve(self, path).cloned()
    }
}
