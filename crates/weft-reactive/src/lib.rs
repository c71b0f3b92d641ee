#![forbid(unsafe_code)]

//! Reactive primitives for Weft.
//!
//! This crate provides the change-tracking half of the binding engine:
//!
//! - [`observe`]: wrap a data tree so every keyed read and write is
//!   reported as a [`ChangeEvent`] to an injected [`ChangeSink`].
//! - [`Observable`]: a shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`ChangeBus`]: a sink that fans events out to live subscribers.
//!
//! # Architecture
//!
//! Everything here is single-threaded and `Rc`-based. The observed tree
//! ([`ReactiveNode`]) owns its data and borrows mutably for writes; sinks
//! and subscribers are shared callbacks stored weakly and pruned lazily.
//! No global state, no ambient logging: events flow only to the sink
//! chosen at [`observe`] time.

pub mod bus;
pub mod event;
pub mod observable;
pub mod tree;

pub use bus::ChangeBus;
pub use event::{ChangeEvent, ChangeSink, NullSink, RecordingSink, TraceSink};
pub use observable::{Observable, Subscription};
pub use tree::{ReactiveMap, ReactiveNode, observe};
