//! The context stack.
//!
//! The stack is never materialized as a collection. Each
//! [`Session::enter_context`] call swaps a new [`ContextFrame`] into the root
//! and keeps the previous one in a [`FrameGuard`] on the Rust call stack; the
//! guard puts it back when dropped, on success, error and unwind alike.

use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::Arc;

use trellis_core::logging::{PerfSpan, TargetDebug, span_names, targets};
use trellis_core::{Error, Result, TargetRef};

use crate::registry::CapabilityProvider;
use crate::session::{LifecycleState, Session};

/// What a context request names: a target, or a token alias resolved through
/// the session's lookup hook.
#[derive(Clone)]
pub enum ContextTarget {
    /// A concrete target.
    Target(TargetRef),
    /// An alias resolved against the root target.
    Token(String),
}

impl From<TargetRef> for ContextTarget {
    fn from(target: TargetRef) -> Self {
        Self::Target(target)
    }
}

impl From<&TargetRef> for ContextTarget {
    fn from(target: &TargetRef) -> Self {
        Self::Target(Arc::clone(target))
    }
}

impl From<&str> for ContextTarget {
    fn from(token: &str) -> Self {
        Self::Token(token.to_string())
    }
}

impl From<String> for ContextTarget {
    fn from(token: String) -> Self {
        Self::Token(token)
    }
}

impl fmt::Debug for ContextTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(target) => f.debug_tuple("Target").field(&TargetDebug(target)).finish(),
            Self::Token(token) => f.debug_tuple("Token").field(token).finish(),
        }
    }
}

/// Record of the target that was current when a context switch happened.
///
/// Informational only; it does not keep the switch alive.
#[derive(Clone)]
pub struct ParentLink {
    target: TargetRef,
}

impl ParentLink {
    fn new(target: TargetRef) -> Self {
        Self { target }
    }

    /// The previous target.
    pub fn target(&self) -> &TargetRef {
        &self.target
    }
}

impl fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParentLink").field(&TargetDebug(&self.target)).finish()
    }
}

/// The mutable context fields of a root session.
#[derive(Default, Clone)]
pub(crate) struct ContextFrame {
    pub(crate) target: Option<TargetRef>,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) provider: Option<Rc<dyn CapabilityProvider>>,
}

/// Restores the previous frame when dropped.
struct FrameGuard<'a> {
    session: &'a Session,
    saved: Option<ContextFrame>,
}

impl<'a> FrameGuard<'a> {
    fn push(
        session: &'a Session,
        target: TargetRef,
        parent: Option<TargetRef>,
        provider: Option<Rc<dyn CapabilityProvider>>,
    ) -> Self {
        let mut state = session.state().borrow_mut();
        let parent = parent.map(ParentLink::new);
        let next = ContextFrame {
            target: Some(target),
            parent,
            provider,
        };
        let saved = mem::replace(&mut state.frame, next);
        Self {
            session,
            saved: Some(saved),
        }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take()
            && let Ok(mut state) = self.session.state().try_borrow_mut()
        {
            state.frame = saved;
        }
    }
}

/// Marks the outermost context of a call chain and restores the previous
/// top-level flag when dropped.
struct TopLevelGuard<'a> {
    session: &'a Session,
    previous: Option<bool>,
}

impl<'a> TopLevelGuard<'a> {
    fn enter(session: &'a Session) -> Self {
        let mut state = session.state().borrow_mut();
        let previous = state.top_level;
        state.top_level = Some(previous.is_none());
        Self { session, previous }
    }

    fn is_top_level(&self) -> bool {
        self.previous.is_none()
    }
}

impl Drop for TopLevelGuard<'_> {
    fn drop(&mut self) {
        let abandoned = match self.session.state().try_borrow_mut() {
            Ok(mut state) => {
                state.top_level = self.previous;
                // An unwinding build abandons its deferred work like a failing one.
                (self.is_top_level() && std::thread::panicking()).then(|| state.deferred.take())
            }
            Err(_) => None,
        };
        drop(abandoned);
    }
}

impl Session {
    /// Make `target` current while `block` runs.
    ///
    /// Non-root sessions forward to their root, and `block` always receives
    /// the root. The previous context is restored when `block` returns, fails
    /// or panics. When this is the outermost context of the call chain and
    /// `block` succeeded, the deferred queue drains before returning; when it
    /// failed or panicked, queued deferred work is discarded.
    ///
    /// Returns the entered target.
    pub fn enter_context<F>(&self, target: impl Into<ContextTarget>, block: F) -> Result<TargetRef>
    where
        F: FnOnce(&Session) -> Result<()>,
    {
        let root = self.root()?;
        let target = root.resolve_context(target.into())?;
        let provider = root.registry().provider_for(&root, &target);

        let top_level = TopLevelGuard::enter(&root);
        let _span = top_level
            .is_top_level()
            .then(|| PerfSpan::new(span_names::SESSION));
        tracing::debug!(
            target: targets::CONTEXT,
            session = %root.id(),
            entered = %TargetDebug(&target),
            top_level = top_level.is_top_level(),
            "entering context"
        );

        // Outside any context the root target is the enclosing one.
        let parent = root.target().ok();
        let result = {
            let _frame = FrameGuard::push(&root, Arc::clone(&target), parent, provider);
            block(&root)
        };

        if !top_level.is_top_level() {
            return result.map(|()| target);
        }

        match result {
            Ok(()) => {
                root.drain(&target)?;
                root.state().borrow_mut().lifecycle = LifecycleState::Active;
                Ok(target)
            }
            Err(err) => {
                let abandoned = root.clear_deferred();
                if abandoned > 0 {
                    tracing::debug!(
                        target: targets::DEFERRED,
                        abandoned,
                        error = %err,
                        "top-level block failed, discarding deferred work"
                    );
                }
                Err(err)
            }
        }
    }

    /// Resolve `target` without entering it.
    pub fn context(&self, target: impl Into<ContextTarget>) -> Result<TargetRef> {
        self.root()?.resolve_context(target.into())
    }

    /// Turn a context request into a target.
    pub(crate) fn resolve_context(&self, target: ContextTarget) -> Result<TargetRef> {
        match target {
            ContextTarget::Target(target) => Ok(target),
            ContextTarget::Token(token) => {
                let root_target = self.root_target().ok_or(Error::NoContext)?;
                let found = self
                    .config()
                    .lookup
                    .as_ref()
                    .and_then(|lookup| lookup(&root_target, &token));
                match found {
                    Some(target) => {
                        tracing::trace!(
                            target: targets::CONTEXT,
                            %token,
                            resolved = %TargetDebug(&target),
                            "resolved token"
                        );
                        Ok(target)
                    }
                    None => Err(Error::TargetNotFound { token }),
                }
            }
        }
    }
}
