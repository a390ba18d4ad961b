//! Dynamic values passed through dispatched calls.
//!
//! Every argument and return value of a dispatched operation is a [`Value`].
//! Targets declare typed handlers and the conversion happens at the edge
//! through [`FromValue`] and the `From<T> for Value` impls.
//!
//! # Example
//!
//! ```
//! use trellis_core::{FromValue, KeywordArgs, Value};
//!
//! let radius = Value::from(4.0);
//! assert_eq!(f64::from_value(&radius).unwrap(), 4.0);
//!
//! let options: KeywordArgs = [("forState", Value::from(1))].into_iter().collect();
//! assert_eq!(options.keys().collect::<Vec<_>>(), vec!["forState"]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::target::TargetRef;

/// A dynamically typed argument or return value.
#[derive(Clone, Default)]
pub enum Value {
    /// No value.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// An ordered keyword mapping.
    Map(KeywordArgs),
    /// A target object.
    Target(TargetRef),
}

impl Value {
    /// A short name for the kind of value, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Target(_) => "target",
        }
    }

    /// Whether this is [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// The keyword mapping, if this is a non-empty [`Value::Map`].
    pub fn as_keywords(&self) -> Option<&KeywordArgs> {
        match self {
            Self::Map(map) if !map.is_empty() => Some(map),
            _ => None,
        }
    }

    /// The target, if this is a [`Value::Target`].
    pub fn as_target(&self) -> Option<&TargetRef> {
        match self {
            Self::Target(target) => Some(target),
            _ => None,
        }
    }

    /// Consume the value, returning the target if it is one.
    pub fn into_target(self) -> Option<TargetRef> {
        match self {
            Self::Target(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "Nil"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Self::Target(t) => write!(f, "Target({}#{})", t.target_type().name(), t.id()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Target(a), Self::Target(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// An ordered keyword-style argument mapping.
///
/// Insertion order is kept because it determines the spelling of the
/// long-form selector (`name:first:second:`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeywordArgs {
    entries: Vec<(String, Value)>,
}

impl KeywordArgs {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key/value pair, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for KeywordArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

/// A value had the wrong kind for the requested conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The expected kind.
    pub expected: &'static str,
    /// The kind that was provided.
    pub got: &'static str,
}

/// Conversion out of a [`Value`].
pub trait FromValue: Sized {
    /// Convert a borrowed value.
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> std::result::Result<T, TypeMismatch> {
    Err(TypeMismatch {
        expected,
        got: value.kind(),
    })
}

impl FromValue for Value {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => mismatch("bool", other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Int(v) => Ok(*v),
            other => mismatch("int", other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Int(v) => i32::try_from(*v).or_else(|_| mismatch("i32", value)),
            other => mismatch("int", other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => mismatch("float", other),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Str(v) => Ok(v.clone()),
            other => mismatch("string", other),
        }
    }
}

impl FromValue for TargetRef {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Target(t) => Ok(t.clone()),
            other => mismatch("target", other),
        }
    }
}

impl FromValue for KeywordArgs {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Map(m) => Ok(m.clone()),
            other => mismatch("map", other),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            other => mismatch("list", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeMismatch> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Nil
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<KeywordArgs> for Value {
    fn from(v: KeywordArgs) -> Self {
        Self::Map(v)
    }
}

impl From<TargetRef> for Value {
    fn from(v: TargetRef) -> Self {
        Self::Target(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_widens_to_float() {
        assert_eq!(f64::from_value(&Value::Int(3)).unwrap(), 3.0);
    }

    #[test]
    fn test_mismatch_reports_kinds() {
        let err = bool::from_value(&Value::from("yes")).unwrap_err();
        assert_eq!(err.expected, "bool");
        assert_eq!(err.got, "string");
    }

    #[test]
    fn test_option_accepts_nil() {
        assert_eq!(Option::<f64>::from_value(&Value::Nil).unwrap(), None);
        assert_eq!(Option::<f64>::from_value(&Value::Float(1.5)).unwrap(), Some(1.5));
    }

    #[test]
    fn test_keyword_args_keep_order() {
        let mut args = KeywordArgs::new();
        args.insert("zeta", 1);
        args.insert("alpha", 2);
        args.insert("zeta", 3);

        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(args.get("zeta"), Some(&Value::Int(3)));
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_as_keywords_ignores_empty_map() {
        assert!(Value::Map(KeywordArgs::new()).as_keywords().is_none());
        assert!(Value::from(1).as_keywords().is_none());
    }

    #[test]
    fn test_i32_range_checked() {
        assert!(i32::from_value(&Value::Int(i64::MAX)).is_err());
        assert_eq!(i32::from_value(&Value::Int(7)).unwrap(), 7);
    }
}
