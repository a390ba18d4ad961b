//! Metadata attached to every target.
//!
//! [`TargetMeta`] is an associative slot store that lives on the target
//! itself, not on any session. It holds two kinds of data:
//!
//! - session-scoped slots, keyed by `(SessionId, name)`, used for example to
//!   bind a target to the capability provider its root session resolved;
//! - target-scoped in-flight flags used by the re-entrancy guard. The flags are
//!   shared by every session that visits the target.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Global session counter for unique IDs.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a builder session.
///
/// Root sessions use their id to scope metadata slots and provider caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate a fresh identifier.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type SlotKey = (SessionId, String);

/// Metadata store attached to a target.
#[derive(Default)]
pub struct TargetMeta {
    slots: Mutex<HashMap<SlotKey, Box<dyn Any + Send + Sync>>>,
    in_flight: Mutex<HashSet<String>>,
}

impl TargetMeta {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `(scope, name)`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&self, scope: SessionId, name: &str, value: T) {
        self.slots
            .lock()
            .insert((scope, name.to_string()), Box::new(value));
    }

    /// Read a value stored under `(scope, name)`.
    ///
    /// Returns `None` if nothing is stored or the stored value has another type.
    pub fn get<T: Any + Clone>(&self, scope: SessionId, name: &str) -> Option<T> {
        self.slots
            .lock()
            .get(&(scope, name.to_string()))
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Mark `name` as in flight on this target.
    ///
    /// Returns `None` when `name` is already in flight. Otherwise the returned
    /// guard clears the flag when dropped, including during unwinding.
    pub fn begin(&self, name: &str) -> Option<InFlight<'_>> {
        if self.in_flight.lock().insert(name.to_string()) {
            Some(InFlight {
                meta: self,
                name: name.to_string(),
            })
        } else {
            crate::trellis_trace!(name, "name already in flight");
            None
        }
    }

    /// Whether `name` is currently in flight on this target.
    pub fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight.lock().contains(name)
    }
}

impl fmt::Debug for TargetMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetMeta")
            .field("slots", &self.slots.lock().len())
            .field("in_flight", &*self.in_flight.lock())
            .finish()
    }
}

/// Clears an in-flight flag when dropped.
#[must_use = "the in-flight flag is cleared as soon as the guard is dropped"]
pub struct InFlight<'a> {
    meta: &'a TargetMeta,
    name: String,
}

impl InFlight<'_> {
    /// The guarded name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.meta.in_flight.lock().remove(&self.name);
    }
}

impl fmt::Debug for InFlight<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InFlight").field(&self.name).finish()
    }
}

static_assertions::assert_impl_all!(TargetMeta: Send, Sync);
