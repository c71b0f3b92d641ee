#![forbid(unsafe_code)]

//! The binding engine: one template, one observed tree, one surface.
//!
//! [`Engine`] is an explicitly owned handle: no global registry, no
//! ambient instance. Construction parses the template, deep-observes the
//! initial data (the observed form becomes the tree of record), resolves
//! the target surface through the host, and performs one initial render.
//! After that, data changes flow through the mutation gate
//! ([`Engine::set_data`]) and each admitted mutation triggers exactly one
//! full re-render.
//!
//! # Invariants
//!
//! 1. Every render pass rewrites the whole surface content; there is no
//!    diffing.
//! 2. `render()` is infallible: unresolved markers degrade into visible
//!    text, never into errors.
//! 3. `render_count()` counts every pass, including the initial one.
//! 4. `output()` publishes each pass's text through an [`Observable`],
//!    which deduplicates equal values; the surface write does not.
//!
//! # Failure Modes
//!
//! | Condition                              | Behavior                          |
//! |----------------------------------------|-----------------------------------|
//! | `el` unknown to the host               | `EngineError::TargetNotFound`     |
//! | `set_data_at` target missing or a leaf | `EngineError::BadMutationTarget`  |
//! | Marker path unresolved at render       | Marker left verbatim in output    |

use core::fmt;
use std::rc::Rc;

use weft_core::{KeyPath, Resolve, Template, Value, WriteError};
use weft_reactive::{ChangeSink, Observable, ReactiveNode, TraceSink, observe};

use crate::gate::{GateView, MutationOutcome, WritePolicy};
use crate::options::EngineOptions;
use crate::surface::{Surface, SurfaceProvider};

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Construction and targeting failures. Render paths never produce these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The host could not resolve the configured target identifier.
    TargetNotFound { id: String },
    /// A mutation was scoped to a path that does not name a mapping.
    BadMutationTarget { path: KeyPath },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetNotFound { id } => write!(f, "no surface found for target '{id}'"),
            Self::BadMutationTarget { path } => {
                write!(f, "mutation target '{path}' is not a mapping")
            }
        }
    }
}

impl std::error::Error for EngineError {}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A running binding: template + observed data tree + host surface.
pub struct Engine {
    template: Template,
    tree: ReactiveNode,
    surface: Box<dyn Surface>,
    target_id: String,
    policy: WritePolicy,
    output: Observable<String>,
    render_count: u64,
}

impl Engine {
    /// Build an engine and perform the initial render.
    ///
    /// Fails only if the host cannot resolve `options.el`; everything else
    /// about the options degrades per the render contract instead of
    /// erroring.
    pub fn new(
        options: EngineOptions,
        host: &mut dyn SurfaceProvider,
    ) -> Result<Self, EngineError> {
        let EngineOptions {
            template,
            el,
            data,
            policy,
            sink,
        } = options;

        let template = Template::parse(&template);
        let sink = sink.unwrap_or_else(|| Rc::new(TraceSink));
        let tree = observe(data, sink);
        let surface = host
            .lookup(&el)
            .ok_or_else(|| EngineError::TargetNotFound { id: el.clone() })?;

        let mut engine = Self {
            template,
            tree,
            surface,
            target_id: el,
            policy,
            output: Observable::new(String::new()),
            render_count: 0,
        };
        tracing::info!(
            target = %engine.target_id,
            markers = engine.template.marker_count(),
            policy = %engine.policy,
            "engine constructed"
        );
        engine.render();
        Ok(engine)
    }

    /// Render the template against the current tree and push the result to
    /// the surface as a full rewrite. Returns the rendered text.
    pub fn render(&mut self) -> String {
        let output = self.template.render(&self.tree);
        self.surface.set_content(&output);
        self.render_count += 1;
        tracing::debug!(pass = self.render_count, bytes = output.len(), "render");
        self.output.set(output.clone());
        output
    }

    /// Run `f` against a gated view of the whole tree.
    ///
    /// See [`GateView`] for the write admission rules; the returned
    /// [`MutationOutcome`] reports every write the mutator issued.
    pub fn set_data(&mut self, f: impl FnOnce(&mut GateView<'_>)) -> MutationOutcome {
        let mut view = GateView::open(self, KeyPath::root());
        f(&mut view);
        view.finish()
    }

    /// Run `f` against a gated view scoped to the subtree at `path`.
    ///
    /// Write and read paths inside the mutator are relative to that
    /// subtree; outcome paths stay absolute. The target must resolve to a
    /// mapping, or the mutator never runs.
    pub fn set_data_at(
        &mut self,
        path: &str,
        f: impl FnOnce(&mut GateView<'_>),
    ) -> Result<MutationOutcome, EngineError> {
        let base = KeyPath::parse(path);
        if !self.node_at(&base).is_some_and(ReactiveNode::is_map) {
            return Err(EngineError::BadMutationTarget { path: base });
        }
        let mut view = GateView::open(self, base);
        f(&mut view);
        Ok(view.finish())
    }

    /// Read `path_expr` from the tree of record, emitting read events.
    #[must_use]
    pub fn get(&self, path_expr: &str) -> Option<Value> {
        self.tree.resolve_path(&KeyPath::parse(path_expr))
    }

    /// Plain copy of the current tree (no events).
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.tree.snapshot()
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The rendered-text cell. Subscribe to observe render output changes;
    /// equal consecutive renders notify once.
    #[must_use]
    pub fn output(&self) -> Observable<String> {
        self.output.clone()
    }

    /// Total render passes so far, the initial render included.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    pub(crate) fn write_policy(&self) -> WritePolicy {
        self.policy
    }

    pub(crate) fn apply_write(&mut self, path: &KeyPath, value: Value) -> Result<(), WriteError> {
        self.tree.write(path, value)
    }

    pub(crate) fn read_path(&self, path: &KeyPath) -> Option<Value> {
        self.tree.resolve_path(path)
    }

    /// Walk to the node at `path` without snapshotting. Emits the same
    /// read events a resolution would.
    fn node_at(&self, path: &KeyPath) -> Option<&ReactiveNode> {
        let mut current = &self.tree;
        for segment in path.segments() {
            match current {
                ReactiveNode::Map(map) => current = map.get(segment.as_str())?,
                ReactiveNode::Leaf(_) => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("target_id", &self.target_id)
            .field("policy", &self.policy)
            .field("markers", &self.template.marker_count())
            .field("render_count", &self.render_count)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
