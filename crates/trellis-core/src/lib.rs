//! Core systems for Trellis.
//!
//! This crate provides the object-side foundations the builder engine
//! dispatches against:
//!
//! - **Values**: [`Value`] and [`KeywordArgs`], the dynamic currency of every call
//! - **Properties**: [`Property`], interior-mutable configurable fields
//! - **Targets**: the [`Target`] trait, [`TargetBase`] and [`TargetType`] lineage
//! - **Method Tables**: [`MethodTable`] and [`Arity`], the declared selectors of a type
//! - **Metadata**: [`TargetMeta`], session-scoped slots and in-flight flags on each target
//! - **Naming**: [`NamingConvention`] and the default [`CamelCase`] translator
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, LazyLock};
//! use trellis_core::{
//!     Arity, MethodTable, Property, Result, Target, TargetBase, TargetId, TargetMeta,
//!     TargetType, Value,
//! };
//!
//! struct Layer {
//!     base: TargetBase,
//!     corner_radius: Property<f64>,
//! }
//!
//! static LAYER: TargetType = TargetType::new("Layer", &[]);
//! static METHODS: LazyLock<MethodTable<Layer>> = LazyLock::new(|| {
//!     MethodTable::new()
//!         .getter("cornerRadius", |l: &Layer| l.corner_radius.get())
//!         .setter("setCornerRadius", |l: &Layer, v: f64| l.corner_radius.set_silent(v))
//! });
//!
//! impl Target for Layer {
//!     fn id(&self) -> TargetId { self.base.id() }
//!     fn target_type(&self) -> &'static TargetType { &LAYER }
//!     fn meta(&self) -> &TargetMeta { self.base.meta() }
//!     fn arity_of(&self, selector: &str) -> Option<Arity> { METHODS.arity_of(selector) }
//!     fn send(&self, selector: &str, args: &[Value]) -> Result<Value> {
//!         METHODS.invoke(self, LAYER.name(), selector, args)
//!     }
//! }
//!
//! let layer = Arc::new(Layer { base: TargetBase::new(), corner_radius: Property::new(0.0) });
//! layer.send("setCornerRadius", &[Value::from(6.0)])?;
//! assert_eq!(layer.corner_radius.get(), 6.0);
//! # Ok::<(), trellis_core::Error>(())
//! ```

mod error;
pub mod logging;
pub mod meta;
pub mod method;
pub mod naming;
pub mod property;
pub mod target;
pub mod value;

pub use error::{Error, Result};
pub use meta::{InFlight, SessionId, TargetMeta};
pub use method::{Arity, MethodTable};
pub use naming::{CamelCase, NamingConvention};
pub use property::Property;
pub use target::{Target, TargetBase, TargetId, TargetRef, TargetType, target_cast};
pub use value::{FromValue, KeywordArgs, TypeMismatch, Value};

#[doc(hidden)]
pub mod __private {
    pub use std::sync::LazyLock;
}
