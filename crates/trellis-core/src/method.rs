//! Per-type method tables.
//!
//! A [`MethodTable`] is how a target type declares which selectors it exposes
//! and with which [`Arity`]. The dispatch resolver never reflects over a
//! target; it asks the table whether a selector is exposed for a given number
//! of arguments and then invokes it.
//!
//! Tables are usually built once per type, either by `#[derive(Target)]` or by
//! hand inside a `LazyLock`.
//!
//! # Example
//!
//! ```
//! use trellis_core::{Arity, MethodTable, Property, Value};
//!
//! struct Dial {
//!     angle: Property<f64>,
//! }
//!
//! let table = MethodTable::<Dial>::new()
//!     .getter("angle", |d| d.angle.get())
//!     .setter("setAngle", |d, v: f64| d.angle.set_silent(v));
//!
//! let dial = Dial { angle: Property::new(0.0) };
//! table.invoke(&dial, "Dial", "setAngle", &[Value::from(90.0)]).unwrap();
//! assert_eq!(table.invoke(&dial, "Dial", "angle", &[]).unwrap(), Value::Float(90.0));
//! assert_eq!(table.arity_of("angle"), Some(Arity::Exact(0)));
//! ```

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::value::{FromValue, Value};

/// How many arguments a selector accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// At least this many arguments.
    AtLeast(usize),
}

impl Arity {
    /// Whether a call with `count` arguments is accepted.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

type Handler<T> = Box<dyn Fn(&T, &[Value]) -> Result<Value> + Send + Sync>;

struct Method<T> {
    arity: Arity,
    handler: Handler<T>,
}

/// The selectors a target type exposes.
pub struct MethodTable<T> {
    methods: HashMap<String, Method<T>>,
}

impl<T> MethodTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Register a raw handler.
    ///
    /// The handler is only called with an argument count accepted by `arity`.
    pub fn method<F>(mut self, selector: impl Into<String>, arity: Arity, handler: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(
            selector.into(),
            Method {
                arity,
                handler: Box::new(handler),
            },
        );
        self
    }

    /// Register a zero-argument probe.
    pub fn getter<V, F>(self, selector: impl Into<String>, getter: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.method(selector, Arity::Exact(0), move |target, _| Ok(getter(target).into()))
    }

    /// Register a one-argument setter.
    pub fn setter<V, F>(self, selector: impl Into<String>, setter: F) -> Self
    where
        V: FromValue,
        F: Fn(&T, V) + Send + Sync + 'static,
    {
        let selector = selector.into();
        let name = selector.clone();
        self.method(selector, Arity::Exact(1), move |target, args| {
            let value = V::from_value(&args[0]).map_err(|mismatch| Error::InvalidArgument {
                selector: name.clone(),
                expected: mismatch.expected,
                got: mismatch.got,
            })?;
            setter(target, value);
            Ok(Value::Nil)
        })
    }

    /// Move every entry of `other` into this table, replacing duplicates.
    pub fn merge(mut self, other: MethodTable<T>) -> Self {
        self.methods.extend(other.methods);
        self
    }

    /// The arity of a selector, or `None` if it is not exposed.
    pub fn arity_of(&self, selector: &str) -> Option<Arity> {
        self.methods.get(selector).map(|m| m.arity)
    }

    /// Whether the selector is exposed for `count` arguments.
    pub fn responds_to(&self, selector: &str, count: usize) -> bool {
        self.arity_of(selector).is_some_and(|arity| arity.accepts(count))
    }

    /// All exposed selectors, unordered.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Number of exposed selectors.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether no selector is exposed.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Invoke a selector on `target`.
    ///
    /// Fails with [`Error::Unsupported`] when the selector is not exposed and
    /// with [`Error::ArgumentCount`] when the arity does not accept `args`.
    pub fn invoke(
        &self,
        target: &T,
        target_type: &'static str,
        selector: &str,
        args: &[Value],
    ) -> Result<Value> {
        let method = self
            .methods
            .get(selector)
            .ok_or_else(|| Error::unsupported(selector, target_type))?;
        if !method.arity.accepts(args.len()) {
            return Err(Error::ArgumentCount {
                selector: selector.to_string(),
                target_type,
                expected: method.arity,
                got: args.len(),
            });
        }
        tracing::trace!(target: crate::logging::targets::TARGET, target_type, selector, argc = args.len(), "invoking selector");
        (method.handler)(target, args)
    }
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut selectors: Vec<_> = self.selectors().collect();
        selectors.sort_unstable();
        f.debug_struct("MethodTable")
            .field("selectors", &selectors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Property;

    struct Knob {
        level: Property<i64>,
    }

    fn table() -> MethodTable<Knob> {
        MethodTable::new()
            .getter("level", |k: &Knob| k.level.get())
            .setter("setLevel", |k: &Knob, v: i64| k.level.set_silent(v))
            .method("sum", Arity::AtLeast(1), |_, args| {
                let total = args.iter().filter_map(|v| i64::from_value(v).ok()).sum::<i64>();
                Ok(Value::Int(total))
            })
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Exact(1).accepts(1));
        assert!(!Arity::Exact(1).accepts(0));
        assert!(Arity::AtLeast(1).accepts(3));
        assert!(!Arity::AtLeast(2).accepts(1));
    }

    #[test]
    fn test_getter_and_setter() {
        let table = table();
        let knob = Knob { level: Property::new(1) };

        table.invoke(&knob, "Knob", "setLevel", &[Value::Int(5)]).unwrap();
        assert_eq!(table.invoke(&knob, "Knob", "level", &[]).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_responds_to_checks_arity() {
        let table = table();
        assert!(table.responds_to("level", 0));
        assert!(!table.responds_to("level", 1));
        assert!(table.responds_to("sum", 4));
        assert!(!table.responds_to("missing", 0));
    }

    #[test]
    fn test_unknown_selector_is_unsupported() {
        let table = table();
        let knob = Knob { level: Property::new(1) };
        let err = table.invoke(&knob, "Knob", "volume", &[]).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_argument_count_checked() {
        let table = table();
        let knob = Knob { level: Property::new(1) };
        let err = table.invoke(&knob, "Knob", "setLevel", &[]).unwrap_err();
        assert!(matches!(err, Error::ArgumentCount { got: 0, .. }));
    }

    #[test]
    fn test_setter_type_mismatch() {
        let table = table();
        let knob = Knob { level: Property::new(1) };
        let err = table
            .invoke(&knob, "Knob", "setLevel", &[Value::from("loud")])
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidArgument {
                selector: "setLevel".into(),
                expected: "int",
                got: "string",
            }
        );
    }

    #[test]
    fn test_merge_replaces_duplicates() {
        let extra = MethodTable::<Knob>::new().getter("level", |_| 99_i64);
        let merged = table().merge(extra);
        let knob = Knob { level: Property::new(1) };
        assert_eq!(merged.invoke(&knob, "Knob", "level", &[]).unwrap(), Value::Int(99));
        assert_eq!(merged.len(), 3);
    }
}
