#![forbid(unsafe_code)]

//! The mutation gate: how writes reach the tree of record.
//!
//! All data mutation flows through [`Engine::set_data`], which opens a
//! [`GateView`] over the tree, runs the caller's mutator, and reports what
//! happened as a [`MutationOutcome`]. Writes issued through the view never
//! fail from the mutator's point of view; writes the gate does not admit
//! are recorded as drops and logged, not surfaced as errors.
//!
//! Two policies:
//!
//! - [`WritePolicy::FirstWriteOnly`] (default): the first write that
//!   applies cleanly is installed and one render pass runs synchronously,
//!   before the mutator resumes. The gate then closes; later writes in the
//!   same mutation are dropped with [`DropReason::GateClosed`]. A write
//!   whose application fails does not consume the admission.
//! - [`WritePolicy::BatchAll`]: writes are queued in issue order and
//!   applied after the mutator returns (later writes to the same path
//!   win), followed by one render pass.
//!
//! # Invariants
//!
//! 1. A mutation that applies zero writes renders zero times; one that
//!    applies at least one write renders exactly once.
//! 2. Under `FirstWriteOnly`, `applied` holds at most one path.
//! 3. The render pass observes the tree strictly after every admitted
//!    write.
//! 4. Every write issued through the view appears in the outcome, in
//!    `applied` or in `dropped`.
//! 5. Outcome and log paths are absolute from the data root, regardless
//!    of the gate's base.
//!
//! # Failure Modes
//!
//! | Condition                         | Behavior                               |
//! |-----------------------------------|-----------------------------------------|
//! | Write after the gate closed       | Dropped (`GateClosed`), WARN logged     |
//! | Write through a missing parent    | Dropped (`Rejected`), gate stays open   |
//! | Write through a scalar/sequence   | Dropped (`Rejected`), gate stays open   |
//! | Mutator panics                    | Propagates; queued writes are abandoned |
//!
//! [`Engine::set_data`]: crate::engine::Engine::set_data

use core::fmt;

use weft_core::{KeyPath, Value, WriteError};

use crate::engine::Engine;

// ---------------------------------------------------------------------------
// Policy & outcome types
// ---------------------------------------------------------------------------

/// How the gate admits writes within one mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Admit the first cleanly-applied write, render, drop the rest.
    #[default]
    FirstWriteOnly,
    /// Queue every write, apply all in order after the mutator, render once.
    BatchAll,
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstWriteOnly => f.write_str("first-write"),
            Self::BatchAll => f.write_str("batch"),
        }
    }
}

/// Why a write issued through the gate was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The gate had already admitted its one write for this mutation.
    GateClosed,
    /// Applying the write failed; the underlying error is preserved.
    Rejected(WriteError),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GateClosed => f.write_str("gate closed"),
            Self::Rejected(err) => err.fmt(f),
        }
    }
}

/// A write the gate did not apply, with its absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedWrite {
    pub path: KeyPath,
    pub reason: DropReason,
}

/// What one `set_data` call did.
#[must_use = "the outcome reports which writes were applied and which were dropped"]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationOutcome {
    /// Paths written to the tree of record, in application order.
    pub applied: Vec<KeyPath>,
    /// Writes that were not applied, in issue order.
    pub dropped: Vec<DroppedWrite>,
    /// Whether this mutation triggered a render pass.
    pub rendered: bool,
}

impl MutationOutcome {
    /// True when every issued write was applied.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}

// ---------------------------------------------------------------------------
// GateView
// ---------------------------------------------------------------------------

/// Exclusive, gated view over the engine's tree for the duration of one
/// mutator call.
///
/// Obtained through [`Engine::set_data`] or [`Engine::set_data_at`]; paths
/// given to [`set`](GateView::set) and [`get`](GateView::get) are relative
/// to the gate's base (the data root for `set_data`).
pub struct GateView<'e> {
    engine: &'e mut Engine,
    base: KeyPath,
    policy: WritePolicy,
    queued: Vec<(KeyPath, Value)>,
    applied: Vec<KeyPath>,
    dropped: Vec<DroppedWrite>,
    rendered: bool,
}

impl<'e> GateView<'e> {
    pub(crate) fn open(engine: &'e mut Engine, base: KeyPath) -> Self {
        let policy = engine.write_policy();
        Self {
            engine,
            base,
            policy,
            queued: Vec::new(),
            applied: Vec::new(),
            dropped: Vec::new(),
            rendered: false,
        }
    }

    /// Issue a write. Never fails; whether it applied shows up in the
    /// mutation's outcome.
    pub fn set(&mut self, path_expr: &str, value: impl Into<Value>) {
        let path = self.base.concat(&KeyPath::parse(path_expr));
        let value = value.into();
        match self.policy {
            WritePolicy::FirstWriteOnly => self.set_first_write(path, value),
            WritePolicy::BatchAll => self.queued.push((path, value)),
        }
    }

    /// Read through the gate. Emits read events like any tree access.
    #[must_use]
    pub fn get(&self, path_expr: &str) -> Option<Value> {
        self.engine
            .read_path(&self.base.concat(&KeyPath::parse(path_expr)))
    }

    fn set_first_write(&mut self, path: KeyPath, value: Value) {
        if !self.applied.is_empty() {
            self.drop_write(path, DropReason::GateClosed);
            return;
        }
        match self.engine.apply_write(&path, value) {
            Ok(()) => {
                tracing::debug!(path = %path, "gate closed after first applied write");
                self.applied.push(path);
                self.engine.render();
                self.rendered = true;
            }
            Err(err) => self.drop_write(path, DropReason::Rejected(err)),
        }
    }

    fn drop_write(&mut self, path: KeyPath, reason: DropReason) {
        tracing::warn!(path = %path, reason = %reason, "write dropped");
        self.dropped.push(DroppedWrite { path, reason });
    }

    pub(crate) fn finish(mut self) -> MutationOutcome {
        if self.policy == WritePolicy::BatchAll {
            let queued = std::mem::take(&mut self.queued);
            for (path, value) in queued {
                match self.engine.apply_write(&path, value) {
                    Ok(()) => self.applied.push(path),
                    Err(err) => self.drop_write(path, DropReason::Rejected(err)),
                }
            }
            if !self.applied.is_empty() {
                tracing::debug!(
                    applied = self.applied.len(),
                    dropped = self.dropped.len(),
                    "batch flushed"
                );
                self.engine.render();
                self.rendered = true;
            }
        }
        MutationOutcome {
            applied: self.applied,
            dropped: self.dropped,
            rendered: self.rendered,
        }
    }
}

impl fmt::Debug for GateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateView")
            .field("base", &self.base)
            .field("policy", &self.policy)
            .field("applied", &self.applied.len())
            .field("dropped", &self.dropped.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
