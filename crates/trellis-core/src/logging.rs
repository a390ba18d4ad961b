//! Logging and debugging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs, install
//! a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("trellis=debug")
//!     .init();
//! ```
//!
//! Context switches log at `debug` under [`targets::CONTEXT`], every
//! resolution strategy logs at `trace` under [`targets::DISPATCH`], and each
//! deferred pass logs under [`targets::DEFERRED`].

use std::fmt;

use crate::target::TargetRef;

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Target model and method tables.
    pub const TARGET: &str = "trellis_core::target";
    /// Context stack.
    pub const CONTEXT: &str = "trellis::context";
    /// Dispatch resolver.
    pub const DISPATCH: &str = "trellis::dispatch";
    /// Deferred queue.
    pub const DEFERRED: &str = "trellis::deferred";
    /// Capability registry.
    pub const REGISTRY: &str = "trellis::registry";
}

/// Span names used for tracing.
pub mod span_names {
    /// A top-level build session.
    pub const SESSION: &str = "trellis::session";
    /// A deferred drain.
    pub const DRAIN: &str = "trellis::drain";
}

/// Display adapter describing a target as `Type#id`.
///
/// ```
/// # use std::sync::Arc;
/// # use trellis_core::{Arity, Result, Target, TargetBase, TargetId, TargetMeta, TargetRef, TargetType, Value};
/// # use trellis_core::logging::TargetDebug;
/// # struct Pane { base: TargetBase }
/// # static PANE: TargetType = TargetType::new("Pane", &[]);
/// # impl Target for Pane {
/// #     fn id(&self) -> TargetId { self.base.id() }
/// #     fn target_type(&self) -> &'static TargetType { &PANE }
/// #     fn meta(&self) -> &TargetMeta { self.base.meta() }
/// #     fn arity_of(&self, _: &str) -> Option<Arity> { None }
/// #     fn send(&self, s: &str, _: &[Value]) -> Result<Value> { Err(trellis_core::Error::unsupported(s, "Pane")) }
/// # }
/// let pane: TargetRef = Arc::new(Pane { base: TargetBase::new() });
/// assert!(TargetDebug(&pane).to_string().starts_with("Pane#"));
/// ```
#[derive(Clone, Copy)]
pub struct TargetDebug<'a>(pub &'a TargetRef);

impl fmt::Display for TargetDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.0.target_type().name(), self.0.id())
    }
}

impl fmt::Debug for TargetDebug<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for timing a whole build session or drain.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Trace-level log under the `trellis_core` target.
#[macro_export]
macro_rules! trellis_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

/// Warn-level log under the `trellis_core` target.
#[macro_export]
macro_rules! trellis_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}
