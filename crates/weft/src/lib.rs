#![forbid(unsafe_code)]

//! Weft public facade: bind a `{{ path }}` template to an observed data
//! tree and keep a host surface in sync through gated mutations.
//!
//! The pieces, bottom up:
//!
//! - [`Value`] / [`KeyPath`] / [`Template`] (`weft-core`): the plain data
//!   tree, dotted paths into it, and the compiled template.
//! - [`observe`] (`weft-reactive`): deep-wraps a tree so reads and writes
//!   emit [`ChangeEvent`]s to a sink of your choosing.
//! - [`Engine`]: owns one template, one observed tree, and one surface;
//!   re-renders in full after each admitted mutation.
//! - [`GateView`] / [`WritePolicy`]: the mutation gate. Under the default
//!   `FirstWriteOnly` policy one write per mutation lands; under `BatchAll`
//!   every write lands and a single render follows.
//!
//! # Example
//!
//! ```
//! use weft::prelude::*;
//!
//! let mut host = MemoryHost::new();
//! host.insert("app");
//!
//! let data = Value::from_pairs([("name", "mog")]);
//! let options = EngineOptions::new("Hello {{name}}", "app", data);
//! let mut engine = Engine::new(options, &mut host).unwrap();
//! assert_eq!(host.content("app").as_deref(), Some("Hello mog"));
//!
//! let outcome = engine.set_data(|d| d.set("name", "weft"));
//! assert!(outcome.rendered);
//! assert_eq!(host.content("app").as_deref(), Some("Hello weft"));
//! ```

pub mod engine;
pub mod gate;
pub mod options;
pub mod surface;

#[cfg(feature = "config")]
pub mod config;

pub use weft_core::{KeyPath, Resolve, Template, Value, ValueKind, WriteError};
pub use weft_reactive::{
    ChangeBus, ChangeEvent, ChangeSink, NullSink, Observable, ReactiveMap, ReactiveNode,
    RecordingSink, Subscription, TraceSink, observe,
};

pub use engine::{Engine, EngineError};
pub use gate::{DropReason, DroppedWrite, GateView, MutationOutcome, WritePolicy};
pub use options::EngineOptions;
pub use surface::{MemoryHost, NullSurface, Surface, SurfaceProvider};

#[cfg(feature = "config")]
pub use config::{ConfigError, EngineConfig};

/// Common imports for binding templates to data.
pub mod prelude {
    pub use crate::engine::{Engine, EngineError};
    pub use crate::gate::{GateView, MutationOutcome, WritePolicy};
    pub use crate::options::EngineOptions;
    pub use crate::surface::{MemoryHost, NullSurface, Surface, SurfaceProvider};

    pub use weft_core::{KeyPath, Template, Value};
    pub use weft_reactive::{ChangeEvent, ChangeSink, Observable, observe};

    #[cfg(feature = "config")]
    pub use crate::config::EngineConfig;
}
