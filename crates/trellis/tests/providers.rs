//! Integration tests for capability providers and the re-entrancy guard.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Label, View, init_tracing};
use trellis::prelude::*;

/// A provider for every `View` that adds a few conveniences.
fn register_view_helpers(registry: &CapabilityRegistry) {
    registry.register("View", |session| {
        Rc::new(
            ProviderMethods::new(session)
                .method("hide", |s, _, _| s.apply("hidden", args![true], None))
                .method("fade:duration:", |s, args, _| {
                    // Duration is ignored; the end state is applied directly.
                    s.apply("alpha", vec![args[0].clone()], None)
                })
                .method("alpha", |s, args, block| {
                    let clamped = match args.first() {
                        Some(Value::Float(v)) => vec![Value::Float(v.clamp(0.0, 1.0))],
                        _ => args.to_vec(),
                    };
                    s.guarded_apply("alpha", clamped, block)
                }),
        )
    });
}

#[test]
fn test_provider_method_wins_over_target() {
    init_tracing();
    let (view, target) = View::shared();
    let session = Session::new();
    register_view_helpers(session.registry());

    session
        .enter_context(&target, |s| {
            s.apply("hide", args![], None)?;
            Ok(())
        })
        .unwrap();
    assert!(view.hidden.get());
}

#[test]
fn test_provider_long_form() {
    init_tracing();
    let (view, target) = View::shared();
    let session = Session::new();
    register_view_helpers(session.registry());

    session
        .enter_context(&target, |s| {
            s.apply("fade", args![0.4, kwargs! { duration: 0.25 }], None)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(view.alpha.get(), 0.4);
}

#[test]
fn test_guard_lets_provider_reach_target() {
    init_tracing();
    let (view, target) = View::shared();
    let session = Session::new();
    register_view_helpers(session.registry());

    session
        .enter_context(&target, |s| {
            s.guarded_apply("alpha", args![0.5], None)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(view.alpha.get(), 0.5);

    // The provider clamps, then hands the name back to reach the view.
    session
        .enter_context(&target, |s| {
            s.guarded_apply("alpha", args![3.0], None)?;
            assert!(!s.target()?.meta().is_in_flight("alpha"));
            Ok(())
        })
        .unwrap();
    assert_eq!(view.alpha.get(), 1.0);
}

#[test]
fn test_guard_flag_cleared_after_failure() {
    init_tracing();
    let (view, target) = View::shared();
    let session = Session::new();
    register_view_helpers(session.registry());

    session
        .enter_context(&target, |s| {
            let err = s.guarded_apply("alpha", args!["opaque"], None).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument { .. }));
            Ok(())
        })
        .unwrap();
    assert!(!view.meta().is_in_flight("alpha"));
}

#[test]
fn test_provider_identity_per_root() {
    init_tracing();
    let registry = Rc::new(CapabilityRegistry::new());
    let created = Rc::new(Cell::new(0));
    let counter = Rc::clone(&created);
    registry.register("View", move |session| {
        counter.set(counter.get() + 1);
        Rc::new(ProviderMethods::new(session))
    });

    let first_root = Session::builder().registry(Rc::clone(&registry)).build();
    let second_root = Session::builder().registry(Rc::clone(&registry)).build();
    let (_, a) = View::shared();
    let (_, b) = View::shared();

    let capture = |session: &Session, target: &TargetRef| {
        let provider = Rc::new(Cell::new(None));
        let slot = Rc::clone(&provider);
        session
            .enter_context(target, move |s| {
                slot.set(Some(s.provider().unwrap()));
                Ok(())
            })
            .unwrap();
        provider.take().unwrap()
    };

    let p1 = capture(&first_root, &a);
    let p2 = capture(&first_root, &b);
    let p3 = capture(&second_root, &a);

    assert!(Rc::ptr_eq(&p1, &p2));
    assert!(!Rc::ptr_eq(&p1, &p3));
    assert_eq!(created.get(), 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_provider_inherited_through_lineage() {
    init_tracing();
    let (label, target) = Label::shared();
    let session = Session::new();
    register_view_helpers(session.registry());

    // Label extends View, so the View helpers apply. Label itself has no
    // `hidden`, so `hide` fails naturally on the label.
    let err = session
        .enter_context(&target, |s| s.apply("hide", args![], None).map(drop))
        .unwrap_err();
    assert_eq!(err, Error::unsupported("setHidden", "Label"));

    session
        .enter_context(&target, |s| {
            s.apply("text", args!["inherited"], None)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(label.text.get(), "inherited");
}

#[test]
fn test_provider_session_is_child_of_root() {
    init_tracing();
    let (view, target) = View::shared();
    let session = Session::new();
    let root_id = session.id();

    session.registry().register("View", move |provider_session| {
        assert!(!provider_session.is_root());
        Rc::new(ProviderMethods::new(provider_session).method(
            "configure_layer",
            move |s, args, _| {
                assert_eq!(s.root()?.id(), root_id);
                let radius = args.first().cloned().unwrap_or(Value::Float(4.0));
                s.call_with("layer", args![], move |s| {
                    s.apply("corner_radius", vec![radius], None).map(drop)
                })
            },
        ))
    });

    let result = session.enter_context(&target, |s| {
        s.apply("configure_layer", args![9.0], None)?;
        assert_eq!(s.target()?.id(), target.id());
        Ok(())
    });
    assert!(result.is_ok());
    assert_eq!(view.layer.corner_radius.get(), 9.0);
}

#[test]
fn test_no_provider_outside_context() {
    init_tracing();
    let (view, target) = View::shared();
    let session = Session::with_root(target);
    register_view_helpers(session.registry());

    // Outside any context the root target is configured directly.
    assert!(session.provider().is_none());
    let err = session.apply("hide", args![], None).unwrap_err();
    assert_eq!(err, Error::unsupported("setHide", "View"));
    assert!(!view.hidden.get());
}
