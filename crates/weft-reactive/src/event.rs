#![forbid(unsafe_code)]

//! Change events and the sinks that consume them.
//!
//! Every read or write that passes through an observed tree is reported as a
//! [`ChangeEvent`] to a [`ChangeSink`] chosen at [`observe`] time. The sink
//! is the observability seam: swap in [`TraceSink`] for structured logging,
//! [`NullSink`] to measure raw overhead, [`RecordingSink`] to assert on
//! emission order, or a [`ChangeBus`] to fan events out to live subscribers.
//!
//! # Invariants
//!
//! 1. `Read` events carry the path as it was asked for, resolved or not.
//! 2. `Write` events are emitted only after the assignment landed.
//! 3. Sinks never fail: `emit` has no return value and must not panic on
//!    any event.
//!
//! [`observe`]: crate::tree::observe
//! [`ChangeBus`]: crate::bus::ChangeBus

use core::fmt;
use std::cell::RefCell;
use std::rc::Rc;

use weft_core::KeyPath;

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// A single property access observed on a reactive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A key was looked up under `path` (emitted before the lookup returns,
    /// whether or not the key exists).
    Read { path: KeyPath },
    /// The value at `path` was replaced (emitted after the new value is in
    /// place).
    Write { path: KeyPath },
}

impl ChangeEvent {
    /// The path this event refers to.
    #[must_use]
    pub fn path(&self) -> &KeyPath {
        match self {
            Self::Read { path } | Self::Write { path } => path,
        }
    }

    /// Whether this is a [`ChangeEvent::Write`].
    #[must_use]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path } => write!(f, "read {path}"),
            Self::Write { path } => write!(f, "write {path}"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeSink
// ---------------------------------------------------------------------------

/// Consumer of change events.
///
/// Implementations observe; they must not mutate the tree that emitted the
/// event (the tree is mid-operation when `emit` runs).
pub trait ChangeSink {
    fn emit(&self, event: &ChangeEvent);
}

/// Forwards events to [`tracing`]: reads at TRACE, writes at DEBUG.
///
/// This is the default sink. Reads fire for every segment of every marker
/// on every render, so they sit below the default filter; writes are the
/// interesting signal and surface one level up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl ChangeSink for TraceSink {
    fn emit(&self, event: &ChangeEvent) {
        match event {
            ChangeEvent::Read { path } => tracing::trace!(path = %path, "read"),
            ChangeEvent::Write { path } => tracing::debug!(path = %path, "write"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChangeSink for NullSink {
    fn emit(&self, _event: &ChangeEvent) {}
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Appends every event to a shared buffer.
///
/// Clones share the buffer, so a clone handed to [`observe`] can be
/// inspected afterwards through the original handle.
///
/// [`observe`]: crate::tree::observe
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }

    /// Paths of recorded `Read` events, in emission order.
    #[must_use]
    pub fn reads(&self) -> Vec<KeyPath> {
        self.events
            .borrow()
            .iter()
            .filter(|event| !event.is_write())
            .map(|event| event.path().clone())
            .collect()
    }

    /// Paths of recorded `Write` events, in emission order.
    #[must_use]
    pub fn writes(&self) -> Vec<KeyPath> {
        self.events
            .borrow()
            .iter()
            .filter(|event| event.is_write())
            .map(|event| event.path().clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl ChangeSink for RecordingSink {
    fn emit(&self, event: &ChangeEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
