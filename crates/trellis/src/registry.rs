//! Capability providers and their registry.
//!
//! A capability provider supplies named convenience operations for a target
//! type, on top of whatever the target exposes itself. Providers are created
//! lazily, one per `(root session, target type)`, from factories registered
//! by type name. A factory registered for an ancestor type serves every
//! descendant without a factory of its own.
//!
//! ```
//! use std::rc::Rc;
//! use trellis::{CapabilityRegistry, ProviderMethods, Value};
//!
//! let registry = CapabilityRegistry::new();
//! registry.register("View", |session| {
//!     Rc::new(ProviderMethods::new(session).method("hidden", |s, _, _| {
//!         s.apply("alpha", vec![Value::Float(0.0)], None)
//!     }))
//! });
//! assert!(registry.has_factory("View"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use trellis_core::logging::{TargetDebug, targets};
use trellis_core::{Error, Result, SessionId, TargetRef, Value};

use crate::session::{Block, Session};

/// Metadata slot binding a target to its provider.
const PROVIDER_SLOT: &str = "provider";

new_key_type! {
    /// Key of a cached provider.
    pub struct ProviderId;
}

/// Named operations offered for a target type.
pub trait CapabilityProvider {
    /// Whether the provider offers `name`.
    fn responds_to(&self, name: &str) -> bool;

    /// Run `name` with `args` and an optional block.
    fn invoke(&self, name: &str, args: &[Value], block: Option<Block>) -> Result<Value>;
}

/// Creates the provider for one root session.
///
/// The factory receives a child session of that root, which the provider
/// keeps to call back into the engine.
pub type ProviderFactory = Rc<dyn Fn(Session) -> Rc<dyn CapabilityProvider>>;

struct ProviderEntry {
    root: SessionId,
    type_name: &'static str,
    provider: Rc<dyn CapabilityProvider>,
}

/// Cache of capability providers keyed by root session and target type.
///
/// The registry only grows. Sharing one registry between several root
/// sessions keeps their providers apart.
#[derive(Default)]
pub struct CapabilityRegistry {
    factories: RefCell<HashMap<String, ProviderFactory>>,
    providers: RefCell<SlotMap<ProviderId, ProviderEntry>>,
    index: RefCell<HashMap<(SessionId, &'static str), ProviderId>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the provider factory for `type_name`, replacing any previous one.
    ///
    /// Providers already created are kept.
    pub fn register<F>(&self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(Session) -> Rc<dyn CapabilityProvider> + 'static,
    {
        let type_name = type_name.into();
        tracing::debug!(target: targets::REGISTRY, %type_name, "registered provider factory");
        self.factories
            .borrow_mut()
            .insert(type_name, Rc::new(factory));
    }

    /// Whether a factory is registered for exactly `type_name`.
    pub fn has_factory(&self, type_name: &str) -> bool {
        self.factories.borrow().contains_key(type_name)
    }

    /// Number of providers created so far.
    pub fn len(&self) -> usize {
        self.providers.borrow().len()
    }

    /// Whether no provider has been created yet.
    pub fn is_empty(&self) -> bool {
        self.providers.borrow().is_empty()
    }

    /// The cached provider with this id.
    pub fn get(&self, id: ProviderId) -> Option<Rc<dyn CapabilityProvider>> {
        self.providers
            .borrow()
            .get(id)
            .map(|entry| Rc::clone(&entry.provider))
    }

    /// Look up or create the provider for `target` under `root`.
    ///
    /// Returns `None` when no factory is registered anywhere in the target's
    /// lineage. The resolved provider id is bound into the target's metadata
    /// under the root's scope and used as the fast path next time.
    pub fn provider_for(
        &self,
        root: &Session,
        target: &TargetRef,
    ) -> Option<Rc<dyn CapabilityProvider>> {
        let scope = root.id();
        if let Some(id) = target.meta().get::<ProviderId>(scope, PROVIDER_SLOT)
            && let Some(provider) = self.get(id)
        {
            return Some(provider);
        }

        let type_name = target.target_type().name();
        let cached = self.index.borrow().get(&(scope, type_name)).copied();
        if let Some(id) = cached {
            target.meta().set(scope, PROVIDER_SLOT, id);
            return self.get(id);
        }

        let factory = self.factory_for(target)?;
        // No borrow is held while the factory runs; it may use the registry.
        let provider = factory(root.spawn_child());
        let id = self.providers.borrow_mut().insert(ProviderEntry {
            root: scope,
            type_name,
            provider: Rc::clone(&provider),
        });
        self.index.borrow_mut().insert((scope, type_name), id);
        target.meta().set(scope, PROVIDER_SLOT, id);

        tracing::debug!(
            target: targets::REGISTRY,
            session = %scope,
            type_name,
            for_target = %TargetDebug(target),
            "created capability provider"
        );
        Some(provider)
    }

    /// The most specific factory in the target's lineage.
    fn factory_for(&self, target: &TargetRef) -> Option<ProviderFactory> {
        let factories = self.factories.borrow();
        let found = target
            .target_type()
            .lineage()
            .find_map(|name| factories.get(name).cloned());
        if found.is_none() {
            tracing::trace!(
                target: targets::REGISTRY,
                type_name = target.target_type().name(),
                "no provider factory in lineage"
            );
        }
        found
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factories: Vec<String> = self.factories.borrow().keys().cloned().collect();
        factories.sort_unstable();
        let providers: Vec<(SessionId, &'static str)> = self
            .providers
            .borrow()
            .values()
            .map(|entry| (entry.root, entry.type_name))
            .collect();
        f.debug_struct("CapabilityRegistry")
            .field("factories", &factories)
            .field("providers", &providers)
            .finish()
    }
}

type ProviderMethod = Box<dyn Fn(&Session, &[Value], Option<Block>) -> Result<Value>>;

/// A provider assembled from closures.
///
/// Each closure receives the provider's own session, a child of the root it
/// was created for.
pub struct ProviderMethods {
    session: Session,
    methods: HashMap<String, ProviderMethod>,
}

impl ProviderMethods {
    /// Create an empty provider bound to `session`.
    pub fn new(session: Session) -> Self {
        Self {
            session,
            methods: HashMap::new(),
        }
    }

    /// Add an operation.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Session, &[Value], Option<Block>) -> Result<Value> + 'static,
    {
        self.methods.insert(name.into(), Box::new(f));
        self
    }

    /// The session this provider calls back into.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl CapabilityProvider for ProviderMethods {
    fn responds_to(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    fn invoke(&self, name: &str, args: &[Value], block: Option<Block>) -> Result<Value> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| Error::unsupported(name, "provider"))?;
        tracing::trace!(target: targets::DISPATCH, name, argc = args.len(), "invoking provider method");
        method(&self.session, args, block)
    }
}

impl fmt::Debug for ProviderMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ProviderMethods")
            .field("session", &self.session)
            .field("methods", &names)
            .finish()
    }
}
