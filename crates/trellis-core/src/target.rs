//! Target model.
//!
//! A target is any object a session can configure. Targets are shared as
//! [`TargetRef`] (`Arc<dyn Target>`) and mutated through `&self`, the same
//! way widgets hold their state in [`Property`](crate::Property) fields.
//!
//! # Key Types
//!
//! - [`Target`] - Trait every configurable object implements
//! - [`TargetBase`] - Helper struct holding the id and metadata store
//! - [`TargetType`] - Static type descriptor with ancestor lineage
//! - [`target_cast`] - Downcast a [`TargetRef`] to its concrete type
//!
//! Most targets derive the trait:
//!
//! ```ignore
//! #[derive(Target)]
//! #[target(extends = "View")]
//! struct Label {
//!     base: TargetBase,
//!     #[style]
//!     text_color: Property<String>,
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::meta::TargetMeta;
use crate::method::Arity;
use crate::value::Value;

/// Global target counter for unique IDs.
static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// A shared, type-erased target.
pub type TargetRef = Arc<dyn Target>;

/// A unique identifier for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Static description of a target type.
///
/// `ancestors` lists more general type names, nearest first. Capability
/// providers registered for an ancestor apply to every descendant that has no
/// provider of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetType {
    name: &'static str,
    ancestors: &'static [&'static str],
}

impl TargetType {
    /// Describe a type with the given ancestors.
    pub const fn new(name: &'static str, ancestors: &'static [&'static str]) -> Self {
        Self { name, ancestors }
    }

    /// The type name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Ancestor type names, nearest first.
    pub const fn ancestors(&self) -> &'static [&'static str] {
        self.ancestors
    }

    /// The type name followed by its ancestors.
    pub fn lineage(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.ancestors.iter().copied())
    }

    /// Whether this type is `name` or descends from it.
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage().any(|n| n == name)
    }
}

/// An object that a session can configure.
///
/// Implementations declare their selectors through [`arity_of`](Self::arity_of)
/// and execute them in [`send`](Self::send). The dispatch resolver only ever
/// calls `send` for a selector it has first seen exposed, except for the final
/// setter fallback and for targets that report
/// [`applies_deferred`](Self::applies_deferred).
pub trait Target: Any + Send + Sync {
    /// This target's unique identifier.
    fn id(&self) -> TargetId;

    /// The static type descriptor.
    fn target_type(&self) -> &'static TargetType;

    /// The attached metadata store.
    fn meta(&self) -> &TargetMeta;

    /// The arity of `selector`, or `None` if it is not exposed.
    fn arity_of(&self, selector: &str) -> Option<Arity>;

    /// Invoke `selector` with `args`.
    fn send(&self, selector: &str, args: &[Value]) -> Result<Value>;

    /// Whether setters take effect later and never show up through a probe.
    ///
    /// Appearance-style proxies return `true`; the resolver then calls the
    /// setter spelling without checking exposure.
    fn applies_deferred(&self) -> bool {
        false
    }

    /// Whether `selector` is exposed for `count` arguments.
    fn responds_to(&self, selector: &str, count: usize) -> bool {
        self.arity_of(selector).is_some_and(|arity| arity.accepts(count))
    }
}

impl fmt::Debug for dyn Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.target_type().name(), self.id())
    }
}

/// Downcast a target to its concrete type.
pub fn target_cast<T: Target>(target: &TargetRef) -> Option<&T> {
    let any: &dyn Any = &**target;
    any.downcast_ref::<T>()
}

/// Helper for implementing [`Target`].
///
/// Include this as a `base` field. It allocates the [`TargetId`] and owns the
/// [`TargetMeta`] store.
pub struct TargetBase {
    id: TargetId,
    meta: TargetMeta,
}

impl TargetBase {
    /// Create a base with a fresh id and empty metadata.
    pub fn new() -> Self {
        Self {
            id: TargetId::next(),
            meta: TargetMeta::new(),
        }
    }

    /// The target id.
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// The metadata store.
    pub fn meta(&self) -> &TargetMeta {
        &self.meta
    }
}

impl Default for TargetBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TargetBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetBase").field("id", &self.id).finish()
    }
}

static_assertions::assert_impl_all!(TargetBase: Send, Sync);
