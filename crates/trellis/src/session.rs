//! Builder sessions.
//!
//! A [`Session`] is the handle every block receives. Exactly one session in a
//! hierarchy is the root: it owns the context frame, the top-level flag, the
//! lifecycle state and the deferred queue. Child sessions, created for
//! capability providers, hold a weak link to their root and forward every
//! context and deferred request to it.
//!
//! # Configuration
//!
//! ```
//! use trellis::{CamelCase, Session};
//!
//! let session = Session::builder()
//!     .naming(CamelCase)
//!     .max_deferred_passes(16)
//!     .build();
//! assert!(session.is_root());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use trellis_core::logging::targets;
use trellis_core::{CamelCase, Error, NamingConvention, Result, SessionId, TargetRef};

use crate::context::{ContextFrame, ParentLink};
use crate::deferred::DeferredQueue;
use crate::registry::{CapabilityProvider, CapabilityRegistry};

/// A block run against a session.
///
/// Blocks passed through dispatch or the deferred queue are boxed and owned by
/// the engine until they run.
pub type Block = Box<dyn FnOnce(&Session) -> Result<()>>;

/// Hook that synthesizes a root target when none was configured.
pub type RootFactory = Rc<dyn Fn() -> Option<TargetRef>>;

/// Hook that resolves a token alias against the root target.
pub type LookupHook = Rc<dyn Fn(&TargetRef, &str) -> Option<TargetRef>>;

/// Whether a root session has completed its first build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No top-level context has completed yet.
    #[default]
    Initial,
    /// At least one top-level context completed successfully.
    Active,
}

/// Configuration for creating a root [`Session`].
#[derive(Clone)]
pub struct SessionConfig {
    /// Translator from word_separated names to native selectors.
    pub naming: Arc<dyn NamingConvention>,
    /// Explicit root target.
    pub root_target: Option<TargetRef>,
    /// Synthesizes a root target when `root_target` is unset.
    pub root_factory: Option<RootFactory>,
    /// Resolves token aliases passed to context requests.
    pub lookup: Option<LookupHook>,
    /// Provider cache, shareable between root sessions.
    pub registry: Rc<CapabilityRegistry>,
    /// Upper bound on deferred drain passes. `None` drains until quiescent.
    pub max_deferred_passes: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            naming: Arc::new(CamelCase),
            root_target: None,
            root_factory: None,
            lookup: None,
            registry: Rc::new(CapabilityRegistry::new()),
            max_deferred_passes: None,
        }
    }
}

impl SessionConfig {
    /// Create a configuration rooted at `target`.
    pub fn with_root(target: TargetRef) -> Self {
        Self {
            root_target: Some(target),
            ..Default::default()
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("root_target", &self.root_target.as_ref().map(|t| t.id()))
            .field("root_factory", &self.root_factory.is_some())
            .field("lookup", &self.lookup.is_some())
            .field("registry", &self.registry)
            .field("max_deferred_passes", &self.max_deferred_passes)
            .finish_non_exhaustive()
    }
}

/// Builder for creating sessions with custom configuration.
#[derive(Debug, Default)]
pub struct SessionBuilder {
    config: SessionConfig,
}

impl SessionBuilder {
    /// Create a new SessionBuilder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming convention.
    pub fn naming(mut self, naming: impl NamingConvention + 'static) -> Self {
        self.config.naming = Arc::new(naming);
        self
    }

    /// Set the explicit root target.
    pub fn root_target(mut self, target: TargetRef) -> Self {
        self.config.root_target = Some(target);
        self
    }

    /// Set the hook that synthesizes a default root target.
    pub fn root_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Option<TargetRef> + 'static,
    {
        self.config.root_factory = Some(Rc::new(factory));
        self
    }

    /// Set the token alias lookup hook.
    pub fn lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&TargetRef, &str) -> Option<TargetRef> + 'static,
    {
        self.config.lookup = Some(Rc::new(lookup));
        self
    }

    /// Share a capability registry.
    pub fn registry(mut self, registry: Rc<CapabilityRegistry>) -> Self {
        self.config.registry = registry;
        self
    }

    /// Cap the number of deferred drain passes.
    pub fn max_deferred_passes(mut self, passes: usize) -> Self {
        self.config.max_deferred_passes = Some(passes);
        self
    }

    /// Build the root session.
    pub fn build(self) -> Session {
        Session::with_config(self.config)
    }
}

/// Mutable state of a root session.
#[derive(Default)]
pub(crate) struct SessionState {
    pub(crate) frame: ContextFrame,
    pub(crate) top_level: Option<bool>,
    pub(crate) lifecycle: LifecycleState,
    pub(crate) deferred: DeferredQueue,
    pub(crate) default_root: Option<TargetRef>,
}

pub(crate) struct SessionInner {
    pub(crate) id: SessionId,
    /// The root session, or `None` when this session is its own root.
    pub(crate) root: Option<Weak<SessionInner>>,
    pub(crate) config: Rc<SessionConfig>,
    /// Only read and written on the root.
    pub(crate) state: RefCell<SessionState>,
}

/// A handle to a builder session.
///
/// Cloning the handle is cheap; clones refer to the same session.
#[derive(Clone)]
pub struct Session {
    pub(crate) inner: Rc<SessionInner>,
}

impl Session {
    /// Create a root session with default settings.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// Create a root session with custom configuration.
    pub fn with_config(config: SessionConfig) -> Self {
        let inner = SessionInner {
            id: SessionId::next(),
            root: None,
            config: Rc::new(config),
            state: RefCell::new(SessionState::default()),
        };
        tracing::debug!(target: targets::CONTEXT, session = %inner.id, "created root session");
        Self {
            inner: Rc::new(inner),
        }
    }

    /// Create a root session whose root target is `target`.
    pub fn with_root(target: TargetRef) -> Self {
        Self::with_config(SessionConfig::with_root(target))
    }

    /// Start building a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// This session's identity.
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Whether this session is its own root.
    pub fn is_root(&self) -> bool {
        self.inner.root.is_none()
    }

    /// The root session of this hierarchy.
    ///
    /// Fails with [`Error::NoContext`] when the root has been dropped.
    pub fn root(&self) -> Result<Session> {
        match &self.inner.root {
            None => Ok(self.clone()),
            Some(weak) => weak
                .upgrade()
                .map(|inner| Session { inner })
                .ok_or(Error::NoContext),
        }
    }

    /// Create a child session that delegates to this session's root.
    pub fn child(&self) -> Result<Session> {
        Ok(self.root()?.spawn_child())
    }

    /// Create a child of this root session.
    pub(crate) fn spawn_child(&self) -> Session {
        debug_assert!(self.is_root());
        let inner = SessionInner {
            id: SessionId::next(),
            root: Some(Rc::downgrade(&self.inner)),
            config: Rc::clone(&self.inner.config),
            state: RefCell::new(SessionState::default()),
        };
        tracing::trace!(target: targets::CONTEXT, root = %self.id(), child = %inner.id, "created child session");
        Session {
            inner: Rc::new(inner),
        }
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// The naming convention in use.
    pub fn naming(&self) -> &dyn NamingConvention {
        &*self.inner.config.naming
    }

    /// The capability registry in use.
    pub fn registry(&self) -> &Rc<CapabilityRegistry> {
        &self.inner.config.registry
    }

    /// The object currently being configured.
    ///
    /// Falls back to the root target outside any context. Fails with
    /// [`Error::NoContext`] when neither exists.
    pub fn target(&self) -> Result<TargetRef> {
        let root = self.root()?;
        let current = root.inner.state.borrow().frame.target.clone();
        match current {
            Some(target) => Ok(target),
            None => root.root_target().ok_or(Error::NoContext),
        }
    }

    /// The previous target recorded by the innermost context switch.
    pub fn parent(&self) -> Option<ParentLink> {
        let root = self.root().ok()?;
        let parent = root.inner.state.borrow().frame.parent.clone();
        parent
    }

    /// The capability provider bound to the current context.
    pub fn provider(&self) -> Option<Rc<dyn CapabilityProvider>> {
        let root = self.root().ok()?;
        let provider = root.inner.state.borrow().frame.provider.clone();
        provider
    }

    /// The explicit root target, or one synthesized by the root factory.
    ///
    /// A synthesized root is created once and reused.
    pub fn root_target(&self) -> Option<TargetRef> {
        let root = self.root().ok()?;
        if let Some(target) = &root.inner.config.root_target {
            return Some(Arc::clone(target));
        }
        if let Some(target) = root.inner.state.borrow().default_root.clone() {
            return Some(target);
        }
        let factory = root.inner.config.root_factory.clone()?;
        let target = factory()?;
        tracing::debug!(
            target: targets::CONTEXT,
            session = %root.id(),
            root = %trellis_core::logging::TargetDebug(&target),
            "synthesized root target"
        );
        root.inner.state.borrow_mut().default_root = Some(Arc::clone(&target));
        Some(target)
    }

    /// Whether the root is inside a context, including the deferred drain
    /// that closes the outermost one.
    pub fn in_context(&self) -> bool {
        self.root()
            .map(|root| root.inner.state.borrow().top_level.is_some())
            .unwrap_or(false)
    }

    /// The root's lifecycle state.
    pub fn lifecycle(&self) -> LifecycleState {
        self.root()
            .map(|root| root.inner.state.borrow().lifecycle)
            .unwrap_or_default()
    }

    /// Run `f` only during the first build.
    pub fn initial<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&Session) -> Result<()>,
    {
        match self.lifecycle() {
            LifecycleState::Initial => f(self),
            LifecycleState::Active => Ok(()),
        }
    }

    /// Run `f` only when a session is rebuilt after its first build.
    pub fn reapply<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&Session) -> Result<()>,
    {
        match self.lifecycle() {
            LifecycleState::Initial => Ok(()),
            LifecycleState::Active => f(self),
        }
    }

    /// Run `f` on every build.
    pub fn always<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&Session) -> Result<()>,
    {
        f(self)
    }

    pub(crate) fn state(&self) -> &RefCell<SessionState> {
        &self.inner.state
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Session {}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("is_root", &self.is_root())
            .finish_non_exhaustive()
    }
}
