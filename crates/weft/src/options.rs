#![forbid(unsafe_code)]

//! Engine construction options.

use core::fmt;
use std::rc::Rc;

use weft_core::Value;
use weft_reactive::ChangeSink;

use crate::gate::WritePolicy;

/// Everything an engine needs at construction time.
///
/// The three required pieces mirror the classic binding setup: a template
/// string, the identifier of the host surface to render into (`el`), and
/// the initial data tree. Policy and sink have defaults; override them with
/// the `with_*` builders.
pub struct EngineOptions {
    /// Template source, scanned once at engine construction.
    pub template: String,
    /// Host surface identifier, resolved through the [`SurfaceProvider`].
    ///
    /// [`SurfaceProvider`]: crate::surface::SurfaceProvider
    pub el: String,
    /// Initial data tree; the engine deep-observes it and keeps the
    /// observed form as the tree of record.
    pub data: Value,
    /// Mutation gate policy. Defaults to [`WritePolicy::FirstWriteOnly`].
    pub policy: WritePolicy,
    /// Change sink for the observed tree. Defaults to the tracing-backed
    /// [`TraceSink`].
    ///
    /// [`TraceSink`]: weft_reactive::TraceSink
    pub sink: Option<Rc<dyn ChangeSink>>,
}

impl EngineOptions {
    pub fn new(template: impl Into<String>, el: impl Into<String>, data: Value) -> Self {
        Self {
            template: template.into(),
            el: el.into(),
            data,
            policy: WritePolicy::default(),
            sink: None,
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Rc<dyn ChangeSink>) -> Self {
        self.sink = Some(sink);
        self
    }
}

impl fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineOptions")
            .field("template", &self.template)
            .field("el", &self.el)
            .field("data", &self.data)
            .field("policy", &self.policy)
            .field("sink", &self.sink.as_ref().map(|_| "custom"))
            .finish()
    }
}
