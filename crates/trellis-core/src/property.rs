//! Interior-mutable style properties.
//!
//! Targets are shared as `Arc<dyn Target>` and configured through `&self`,
//! so every configurable field is stored in a [`Property`]. Fields marked
//! `#[style]` under `#[derive(Target)]` must be `Property<T>`.
//!
//! # Example
//!
//! ```
//! use trellis_core::Property;
//!
//! let radius = Property::new(0.0);
//! radius.set_silent(4.0);
//! assert_eq!(radius.get(), 4.0);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A configurable value.
///
/// `Property<T>` uses a `RwLock` internally and is `Send + Sync` whenever `T`
/// is, so targets holding properties can be shared across sessions.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Store a value.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&self.get()).finish()
    }
}
