//! The re-entrancy guard.
//!
//! A provider operation often finishes by handing the same name back to the
//! session so the target receives it too. Without a guard that call would
//! find the provider again and recurse forever. [`Session::guarded_apply`]
//! marks the name as in flight on the target for the duration of the call; a
//! nested call for the same name on the same target skips the provider and
//! goes straight to the target conventions.

use trellis_core::logging::targets;
use trellis_core::{Result, Value};

use crate::dispatch::LongForm;
use crate::session::{Block, Session};

/// Names that collide with the session's own operations.
///
/// [`Session::call`] routes these through the guard so that a target
/// exposing, say, `root` can still be configured through the session.
pub const RESERVED_NAMES: &[&str] = &[
    "always",
    "apply",
    "context",
    "deferred",
    "initial",
    "parent",
    "reapply",
    "root",
    "target",
];

/// Whether `name` collides with the session's own operations.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

impl Session {
    /// Apply `name`, guarding against re-entry for the same target and name.
    ///
    /// The first call runs the full [`apply`](Self::apply). A nested call with
    /// the same name on the same target bypasses the capability provider. The
    /// in-flight flag is cleared on every exit path.
    pub fn guarded_apply(&self, name: &str, args: Vec<Value>, block: Option<Block>) -> Result<Value> {
        let target = self.dispatch_target(name)?;
        let in_flight = target.meta().begin(name);
        if in_flight.is_some() {
            return self.apply(name, args, block);
        }

        tracing::trace!(target: targets::DISPATCH, name, "re-entrant call, bypassing provider");
        let long_form = LongForm::fold(self, name, &args);
        self.apply_direct(&target, name, args, long_form, block)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::registry::ProviderMethods;
    use crate::test_support::Pane;
    use crate::{args, SessionBuilder};

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved("context"));
        assert!(is_reserved("root"));
        assert!(!is_reserved("alpha"));
    }

    #[test]
    fn test_guard_stops_provider_recursion() {
        let pane = Pane::shared();
        let session = SessionBuilder::new().build();
        session.registry().register("Pane", |session| {
            Rc::new(ProviderMethods::new(session).method("alpha", |s, args, block| {
                // Hand the name back so the pane receives it too.
                s.guarded_apply("alpha", args.to_vec(), block)
            }))
        });

        session
            .enter_context(&pane, |s| {
                s.guarded_apply("alpha", args![0.5], None)?;
                assert!(!s.target()?.meta().is_in_flight("alpha"));
                Ok(())
            })
            .unwrap();
        assert_eq!(pane.send("alpha", &[]).unwrap(), Value::Float(0.5));
    }

    #[test]
    fn test_guard_cleared_on_error() {
        let pane = Pane::shared();
        let session = Session::with_root(pane.clone());
        assert!(session.guarded_apply("sparkle", args![1], None).is_err());
        assert!(!pane.meta().is_in_flight("sparkle"));
    }

    #[test]
    fn test_call_routes_reserved_names() {
        let pane = Pane::shared();
        let session = Session::with_root(pane.clone());
        session.call("root", args!["main"]).unwrap();
        assert_eq!(session.call("root", args![]).unwrap(), Value::from("main"));
    }
}
