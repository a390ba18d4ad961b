//! The dispatch resolver.
//!
//! [`Session::apply`] turns an undeclared call into an operation on the
//! current target. The bound capability provider gets the first chance; after
//! that the resolver walks a fixed list of conventions against the target,
//! checking exposure before each attempt so only "not exposed" moves on to the
//! next strategy. Any error raised by an operation that was actually invoked
//! propagates unchanged.

use trellis_core::logging::{TargetDebug, targets};
use trellis_core::{Error, Result, TargetRef, Value};

use crate::guard;
use crate::session::{Block, Session};

/// A call folded into its long-form selector.
///
/// `apply("setTitle", [title, {forState: s}])` folds into
/// `setTitle:forState:` with `[title, s]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LongForm {
    /// The combined selector.
    pub selector: String,
    /// The first positional argument followed by the keyword values.
    pub args: Vec<Value>,
}

impl LongForm {
    /// Fold `name` and `args` when there are exactly two arguments and the
    /// second is a non-empty keyword mapping.
    pub fn fold(session: &Session, name: &str, args: &[Value]) -> Option<Self> {
        let [first, second] = args else {
            return None;
        };
        let keywords = second.as_keywords()?;
        let keys: Vec<&str> = keywords.keys().collect();
        let selector = session.naming().long_form(name, &keys);
        let args = std::iter::once(first.clone())
            .chain(keywords.values().cloned())
            .collect();
        Some(Self { selector, args })
    }
}

impl Session {
    /// Apply `name` to the current target.
    ///
    /// A call with a block switches context to the object the call returns
    /// and runs the block there; the entered target is returned as
    /// [`Value::Target`]. Without a block the call configures or probes the
    /// current target.
    ///
    /// Fails with [`Error::Apply`] for an empty name and with
    /// [`Error::UndefinedMethod`] when no target is established.
    pub fn apply(&self, name: &str, args: Vec<Value>, block: Option<Block>) -> Result<Value> {
        if name.is_empty() {
            let type_name = self
                .target()
                .map_or("session", |target| target.target_type().name());
            return Err(Error::apply(name, type_name));
        }
        let target = self.dispatch_target(name)?;
        let long_form = LongForm::fold(self, name, &args);

        if let Some(provider) = self.provider() {
            if let Some(long) = &long_form
                && provider.responds_to(&long.selector)
            {
                tracing::trace!(target: targets::DISPATCH, selector = %long.selector, "provider long form");
                return provider.invoke(&long.selector, &long.args, block);
            }
            if provider.responds_to(name) {
                tracing::trace!(target: targets::DISPATCH, name, "provider method");
                return provider.invoke(name, &args, block);
            }
        }

        self.apply_direct(&target, name, args, long_form, block)
    }

    /// The current target, reporting a missing context as an undefined
    /// method `name`.
    pub(crate) fn dispatch_target(&self, name: &str) -> Result<TargetRef> {
        self.target().map_err(|err| match err {
            Error::NoContext => Error::undefined_method(name),
            other => other,
        })
    }

    /// Dispatch against the target itself, bypassing the provider.
    pub(crate) fn apply_direct(
        &self,
        target: &TargetRef,
        name: &str,
        args: Vec<Value>,
        long_form: Option<LongForm>,
        block: Option<Block>,
    ) -> Result<Value> {
        match block {
            Some(block) => self.apply_with_context(target, name, args, long_form, block),
            None => self.apply_with_target(target, name, args, long_form),
        }
    }

    /// Call a context-switching operation and run `block` inside its result.
    fn apply_with_context(
        &self,
        target: &TargetRef,
        name: &str,
        args: Vec<Value>,
        long_form: Option<LongForm>,
        block: Block,
    ) -> Result<Value> {
        let naming = self.naming();

        if let Some(long) = long_form
            && target.responds_to(&long.selector, long.args.len())
        {
            let result = target.send(&long.selector, &long.args)?;
            return self.enter_result(&long.selector, result, block);
        }

        if args.len() == 1 {
            let selector = naming.selector(name);
            if target.responds_to(&selector, 1) {
                let result = target.send(&selector, &args)?;
                return self.enter_result(&selector, result, block);
            }
        }

        if target.responds_to(name, args.len()) {
            let result = target.send(name, &args)?;
            return self.enter_result(name, result, block);
        }

        if let Some(translated) = self.translated(name) {
            return self.apply(&translated, args, Some(block));
        }

        Err(Error::apply(name, target.target_type().name()))
    }

    /// Enter the target returned by a context-switching call.
    fn enter_result(&self, selector: &str, result: Value, block: Block) -> Result<Value> {
        let got = result.kind();
        let next = result.into_target().ok_or_else(|| Error::NotATarget {
            selector: selector.to_string(),
            got,
        })?;
        tracing::trace!(target: targets::DISPATCH, selector, next = %TargetDebug(&next), "switching context");
        let entered = self.enter_context(next, block)?;
        Ok(Value::Target(entered))
    }

    /// Configure or probe the target through its naming conventions.
    fn apply_with_target(
        &self,
        target: &TargetRef,
        name: &str,
        args: Vec<Value>,
        long_form: Option<LongForm>,
    ) -> Result<Value> {
        let naming = self.naming();
        let argc = args.len();

        if let Some(long) = long_form
            && target.responds_to(&long.selector, long.args.len())
        {
            tracing::trace!(target: targets::DISPATCH, selector = %long.selector, "long form");
            return target.send(&long.selector, &long.args);
        }

        if argc == 0 && target.responds_to(name, 0) {
            tracing::trace!(target: targets::DISPATCH, name, "probe");
            return target.send(name, &[]);
        }

        let setter = naming.setter(name);
        if target.responds_to(&setter, argc) {
            tracing::trace!(target: targets::DISPATCH, selector = %setter, "setter");
            return target.send(&setter, &args);
        }

        let assignment = naming.assignment(name);
        if target.responds_to(&assignment, argc) {
            tracing::trace!(target: targets::DISPATCH, selector = %assignment, "assignment");
            return target.send(&assignment, &args);
        }

        if argc > 0 && target.responds_to(name, argc) {
            tracing::trace!(target: targets::DISPATCH, name, "combined accessor");
            return target.send(name, &args);
        }

        if target.applies_deferred() {
            tracing::trace!(target: targets::DISPATCH, selector = %setter, "deferred setter");
            return target.send(&setter, &args);
        }

        if let Some(translated) = self.translated(name) {
            return self.apply(&translated, args, None);
        }

        tracing::trace!(
            target: targets::DISPATCH,
            selector = %setter,
            on = %TargetDebug(target),
            "no convention matched, sending setter"
        );
        target.send(&setter, &args)
    }

    /// The translated spelling of a word-separated name, if it differs.
    fn translated(&self, name: &str) -> Option<String> {
        let naming = self.naming();
        if !naming.is_word_separated(name) {
            return None;
        }
        let translated = naming.translate(name);
        (translated != name).then(|| {
            tracing::trace!(target: targets::DISPATCH, name, %translated, "retrying translated name");
            translated
        })
    }

    /// Call `name` on the current target.
    ///
    /// Names that collide with the session's own surface go through the
    /// re-entrancy guard.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        if guard::is_reserved(name) {
            self.guarded_apply(name, args, None)
        } else {
            self.apply(name, args, None)
        }
    }

    /// Call `name` with a block, switching context to the object it returns.
    pub fn call_with<F>(&self, name: &str, args: Vec<Value>, block: F) -> Result<Value>
    where
        F: FnOnce(&Session) -> Result<()> + 'static,
    {
        let block: Block = Box::new(block);
        if guard::is_reserved(name) {
            self.guarded_apply(name, args, Some(block))
        } else {
            self.apply(name, args, Some(block))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Pane, Slider};
    use crate::{args, kwargs};

    #[test]
    fn test_fold_long_form() {
        let session = Session::new();
        let long = LongForm::fold(&session, "foo", &args![1, kwargs! { a: 1, b: 2 }]).unwrap();
        assert_eq!(long.selector, "foo:a:b:");
        assert_eq!(long.args, args![1, 1, 2]);
    }

    #[test]
    fn test_fold_requires_two_args_and_keywords() {
        let session = Session::new();
        assert!(LongForm::fold(&session, "foo", &args![kwargs! { a: 1 }]).is_none());
        assert!(LongForm::fold(&session, "foo", &args![1, 2]).is_none());
        assert!(LongForm::fold(&session, "foo", &args![1, kwargs! {}]).is_none());
        assert!(LongForm::fold(&session, "foo", &args![1, kwargs! { a: 1 }, 3]).is_none());
    }

    #[test]
    fn test_no_context_is_undefined_method() {
        let session = Session::new();
        let err = session.apply("alpha", args![0.5], None).unwrap_err();
        assert_eq!(err, Error::undefined_method("alpha"));
    }

    #[test]
    fn test_empty_name_is_apply_error() {
        let session = Session::with_root(Pane::shared());
        let err = session.apply("", args![], None).unwrap_err();
        assert_eq!(err, Error::apply("", "Pane"));
    }

    #[test]
    fn test_empty_name_without_context() {
        let session = Session::new();
        let err = session.apply("", args![1], None).unwrap_err();
        assert_eq!(err, Error::apply("", "session"));
    }

    #[test]
    fn test_probe_then_setter() {
        let pane = Pane::shared();
        let session = Session::with_root(pane.clone());

        session.apply("alpha", args![0.25], None).unwrap();
        assert_eq!(session.apply("alpha", args![], None).unwrap(), Value::Float(0.25));
    }

    #[test]
    fn test_translated_name() {
        let session = Session::with_root(Pane::shared());
        session.apply("corner_radius", args![4.0], None).unwrap();
        assert_eq!(
            session.apply("corner_radius", args![], None).unwrap(),
            Value::Float(4.0)
        );
    }

    #[test]
    fn test_unknown_name_falls_through_to_setter() {
        let session = Session::with_root(Pane::shared());
        let err = session.apply("sparkle", args![true], None).unwrap_err();
        assert_eq!(err, Error::unsupported("setSparkle", "Pane"));
    }

    #[test]
    fn test_operation_errors_propagate() {
        let session = Session::with_root(Slider::shared());
        let err = session.apply("value", args![2.0], None).unwrap_err();
        assert_eq!(err, Error::operation("value out of range: 2"));
    }

    #[test]
    fn test_context_call_requires_target_result() {
        let session = Session::with_root(Pane::shared());
        let block: Block = Box::new(|_| Ok(()));
        let err = session.apply("alpha", args![], Some(block)).unwrap_err();
        assert_eq!(
            err,
            Error::NotATarget {
                selector: "alpha".into(),
                got: "float"
            }
        );
    }

    #[test]
    fn test_context_call_without_match() {
        let session = Session::with_root(Pane::shared());
        let block: Block = Box::new(|_| Ok(()));
        let err = session.apply("sublayer", args![], Some(block)).unwrap_err();
        assert_eq!(err, Error::apply("sublayer", "Pane"));
    }
}
