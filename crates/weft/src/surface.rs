#![forbid(unsafe_code)]

//! Host surfaces: where rendered output lands.
//!
//! The engine does not know what a "page" is. It asks a [`SurfaceProvider`]
//! to resolve the target identifier it was configured with, and from then
//! on pushes every render pass to the returned [`Surface`] as a full text
//! rewrite. Hosts stay free to map identifiers to whatever they like: a
//! DOM-ish node tree, a terminal region, a plain buffer.
//!
//! Two implementations ship in-tree: [`MemoryHost`], the standard test
//! double with named readable nodes, and [`NullSurface`], which accepts
//! everything and keeps nothing.

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use weft_core::value::IndexMap;

/// A text node the engine can rewrite.
pub trait Surface {
    /// Replace the entire content of this surface.
    fn set_content(&mut self, text: &str);
}

/// Resolves target identifiers to surfaces.
pub trait SurfaceProvider {
    /// Look up `id`, handing out a surface bound to it. Returns `None` when
    /// the host knows no such target.
    fn lookup(&mut self, id: &str) -> Option<Box<dyn Surface>>;
}

// ---------------------------------------------------------------------------
// MemoryHost
// ---------------------------------------------------------------------------

/// Named in-memory text nodes.
///
/// Each node is a shared string: the surface handed to an engine and the
/// host's own [`content`] view stay connected, so tests can read what the
/// engine last rendered.
///
/// [`content`]: MemoryHost::content
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: IndexMap<String, Rc<RefCell<String>>>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an empty node under `id`, replacing any existing one.
    pub fn insert(&mut self, id: impl Into<String>) {
        self.nodes
            .insert(id.into(), Rc::new(RefCell::new(String::new())));
    }

    /// Current content of the node `id`, if it exists.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<String> {
        self.nodes.get(id).map(|node| node.borrow().clone())
    }

    /// Registered node identifiers, in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

impl SurfaceProvider for MemoryHost {
    fn lookup(&mut self, id: &str) -> Option<Box<dyn Surface>> {
        self.nodes
            .get(id)
            .map(|node| Box::new(MemoryNode(Rc::clone(node))) as Box<dyn Surface>)
    }
}

struct MemoryNode(Rc<RefCell<String>>);

impl Surface for MemoryNode {
    fn set_content(&mut self, text: &str) {
        let mut content = self.0.borrow_mut();
        content.clear();
        content.push_str(text);
    }
}

// ---------------------------------------------------------------------------
// NullSurface
// ---------------------------------------------------------------------------

/// Accepts and discards all writes.
///
/// Doubles as a provider that resolves *every* identifier to itself, for
/// tests and benchmarks that exercise the engine without caring about
/// output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn set_content(&mut self, _text: &str) {}
}

impl SurfaceProvider for NullSurface {
    fn lookup(&mut self, _id: &str) -> Option<Box<dyn Surface>> {
        Some(Box::new(NullSurface))
    }
}

impl fmt::Display for NullSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("null surface")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
