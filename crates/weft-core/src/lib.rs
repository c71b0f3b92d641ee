#![forbid(unsafe_code)]

//! Core data model for Weft: the plain-data tree, dotted paths into it,
//! graceful path resolution, and `{{ path }}` text templates.
//!
//! This crate is deliberately free of reactivity: everything here is
//! plain values and pure functions. The observed form of a tree lives in
//! `weft-reactive`; the engine that ties trees, templates, and surfaces
//! together lives in `weft`.

pub mod path;
pub mod resolve;
pub mod template;
pub mod value;

pub use path::KeyPath;
pub use resolve::{Resolve, WriteError, resolve, write};
pub use template::Template;
pub use value::{Value, ValueKind};
