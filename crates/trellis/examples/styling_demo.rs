//! Trellis Styling Demo
//!
//! Builds a small card layout against plain targets:
//! - nested contexts through a returned sublayer
//! - a capability provider adding a `card` convenience
//! - deferred work that runs once the layout is complete
//! - a rebuild that only runs `reapply` blocks
//!
//! Run with: RUST_LOG=trellis=debug cargo run -p trellis --example styling_demo

use std::rc::Rc;
use std::sync::Arc;

use trellis::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Target)]
struct Layer {
    base: TargetBase,

    #[style]
    corner_radius: Property<f64>,

    #[style]
    shadow_opacity: Property<f64>,
}

#[derive(Target)]
#[target(name = "View", methods = "view_methods")]
struct Card {
    base: TargetBase,

    #[style]
    background_color: Property<String>,

    #[style]
    alpha: Property<f64>,

    layer: Arc<Layer>,
}

impl Card {
    fn new() -> Self {
        Self {
            base: TargetBase::new(),
            background_color: Property::new("clear".to_string()),
            alpha: Property::new(1.0),
            layer: Arc::new(Layer {
                base: TargetBase::new(),
                corner_radius: Property::new(0.0),
                shadow_opacity: Property::new(0.0),
            }),
        }
    }

    fn view_methods(table: MethodTable<Self>) -> MethodTable<Self> {
        table.getter("layer", |card: &Card| {
            let layer: TargetRef = card.layer.clone();
            layer
        })
    }
}

#[derive(Target)]
#[target(extends = "View")]
struct Title {
    base: TargetBase,

    #[style]
    text: Property<String>,

    #[style]
    text_color: Property<String>,
}

fn register_helpers(registry: &CapabilityRegistry) {
    registry.register("View", |session| {
        Rc::new(ProviderMethods::new(session).method("card", |s, _, _| {
            s.apply("background_color", args!["white"], None)?;
            s.call_with("layer", args![], |s| {
                s.apply("corner_radius", args![12.0], None)?;
                s.apply("shadow_opacity", args![0.2], None)?;
                Ok(())
            })
        }))
    });
}

fn build(session: &Session, card: &TargetRef, title: &TargetRef) -> Result<()> {
    let title = Arc::clone(title);
    session.enter_context(card, move |s| {
        s.initial(|s| s.apply("card", args![], None).map(drop))?;
        s.reapply(|s| s.apply("alpha", args![0.8], None).map(drop))?;

        s.enter_context(&title, |s| {
            s.apply("text", args!["Trellis"], None)?;
            // Resolved after the whole layout is built.
            s.deferred(|s| s.apply("text_color", args!["slate"], None).map(drop))
        })?;
        Ok(())
    })?;
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let card = Arc::new(Card::new());
    let title = Arc::new(Title {
        base: TargetBase::new(),
        text: Property::new(String::new()),
        text_color: Property::new("black".to_string()),
    });
    let card_target: TargetRef = card.clone();
    let title_target: TargetRef = title.clone();

    let session = Session::builder().max_deferred_passes(8).build();
    register_helpers(session.registry());

    build(&session, &card_target, &title_target)?;
    println!(
        "first build:  background={} radius={} shadow={} title={:?} color={}",
        card.background_color.get(),
        card.layer.corner_radius.get(),
        card.layer.shadow_opacity.get(),
        title.text.get(),
        title.text_color.get(),
    );

    build(&session, &card_target, &title_target)?;
    println!(
        "second build: alpha={} lifecycle={:?}",
        card.alpha.get(),
        session.lifecycle()
    );

    Ok(())
}
