//! Trellis - a builder DSL engine.
//!
//! A caller describes a tree of style and configuration calls against an
//! implicit current target, without naming the target on every line. This
//! crate is the engine behind that:
//!
//! - **Sessions**: [`Session`], the handle every block receives, and its
//!   [`SessionConfig`] / [`SessionBuilder`]
//! - **Context stack**: [`Session::enter_context`] makes a target current for
//!   the duration of a block and restores the previous one afterwards
//! - **Dispatch**: [`Session::apply`] resolves an undeclared call against the
//!   current target through its capability provider and naming conventions
//! - **Deferred work**: [`Session::deferred`] queues blocks that run once the
//!   outermost context closes
//! - **Capability providers**: [`CapabilityRegistry`] caches one provider per
//!   root session and target type
//!
//! The object side (values, targets, method tables, naming) lives in
//! `trellis-core` and is re-exported here, together with `#[derive(Target)]`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! #[derive(Target)]
//! struct Layer {
//!     base: TargetBase,
//!     #[style]
//!     corner_radius: Property<f64>,
//! }
//!
//! let layer = Arc::new(Layer { base: TargetBase::new(), corner_radius: Property::new(0.0) });
//! let target: TargetRef = layer.clone();
//!
//! let session = Session::new();
//! session.enter_context(&target, |s| {
//!     s.apply("corner_radius", args![6.0], None)?;
//!     Ok(())
//! })?;
//! assert_eq!(layer.corner_radius.get(), 6.0);
//! # Ok::<(), trellis::Error>(())
//! ```

pub use trellis_core::*;
pub use trellis_macros::*;

mod context;
mod deferred;
mod dispatch;
mod guard;
mod macros;
pub mod prelude;
mod registry;
mod session;

#[cfg(test)]
mod test_support;

pub use context::{ContextTarget, ParentLink};
pub use deferred::DeferredEntry;
pub use dispatch::LongForm;
pub use guard::{RESERVED_NAMES, is_reserved};
pub use registry::{
    CapabilityProvider, CapabilityRegistry, ProviderFactory, ProviderId, ProviderMethods,
};
pub use session::{
    Block, LifecycleState, LookupHook, RootFactory, Session, SessionBuilder, SessionConfig,
};

static_assertions::assert_not_impl_any!(Session: Send, Sync);
