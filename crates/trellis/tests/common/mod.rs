//! Targets shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use trellis::prelude::*;
use trellis::{TargetMeta, TypeMismatch};

/// Install a test subscriber once; `RUST_LOG=trellis=trace` shows dispatch.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Target)]
pub struct Layer {
    base: TargetBase,

    #[style]
    pub corner_radius: Property<f64>,

    #[style]
    pub border_width: Property<f64>,
}

impl Layer {
    pub fn new() -> Self {
        Self {
            base: TargetBase::new(),
            corner_radius: Property::new(0.0),
            border_width: Property::new(0.0),
        }
    }
}

#[derive(Target)]
#[target(methods = "view_methods")]
pub struct View {
    base: TargetBase,

    #[style]
    pub alpha: Property<f64>,

    #[style]
    pub background_color: Property<String>,

    #[style]
    pub hidden: Property<bool>,

    pub layer: Arc<Layer>,
    pub subviews: Property<Vec<TargetRef>>,
}

impl View {
    pub fn new() -> Self {
        Self {
            base: TargetBase::new(),
            alpha: Property::new(1.0),
            background_color: Property::new("clear".to_string()),
            hidden: Property::new(false),
            layer: Arc::new(Layer::new()),
            subviews: Property::new(Vec::new()),
        }
    }

    pub fn shared() -> (Arc<View>, TargetRef) {
        let view = Arc::new(Self::new());
        let target: TargetRef = view.clone();
        (view, target)
    }

    fn view_methods(table: MethodTable<Self>) -> MethodTable<Self> {
        table
            .getter("layer", |view: &View| {
                let layer: TargetRef = view.layer.clone();
                layer
            })
            .method("addSubview:", Arity::Exact(1), |view, args| {
                let Some(subview) = args[0].as_target() else {
                    return Err(Error::InvalidArgument {
                        selector: "addSubview:".into(),
                        expected: "target",
                        got: args[0].kind(),
                    });
                };
                let mut subviews = view.subviews.get();
                subviews.push(subview.clone());
                view.subviews.set_silent(subviews);
                Ok(args[0].clone())
            })
    }
}

#[derive(Target)]
#[target(extends = "View", methods = "label_methods")]
pub struct Label {
    base: TargetBase,

    #[style]
    pub text: Property<String>,

    #[style]
    pub text_color: Property<String>,

    pub title: Property<String>,
    pub titles: Property<Vec<(String, String)>>,
    pub lines: Property<i64>,
    pub tint: Property<String>,
}

impl Label {
    pub fn new() -> Self {
        Self {
            base: TargetBase::new(),
            text: Property::new(String::new()),
            text_color: Property::new("black".to_string()),
            title: Property::new(String::new()),
            titles: Property::new(Vec::new()),
            lines: Property::new(1),
            tint: Property::new(String::new()),
        }
    }

    pub fn shared() -> (Arc<Label>, TargetRef) {
        let label = Arc::new(Self::new());
        let target: TargetRef = label.clone();
        (label, target)
    }

    fn label_methods(table: MethodTable<Self>) -> MethodTable<Self> {
        table
            .setter("setTitle", |label: &Label, title: String| {
                label.title.set_silent(title)
            })
            .method("setTitle:forState:", Arity::Exact(2), |label, args| {
                let title = String::from_value(&args[0])
                    .map_err(|m| mismatch("setTitle:forState:", m))?;
                let state = String::from_value(&args[1])
                    .map_err(|m| mismatch("setTitle:forState:", m))?;
                let mut titles = label.titles.get();
                titles.push((state, title));
                label.titles.set_silent(titles);
                Ok(Value::Nil)
            })
            // Assignment is the only way to set the line count.
            .setter("lines=", |label: &Label, lines: i64| label.lines.set_silent(lines))
            .getter("lines", |label: &Label| label.lines.get())
            // A combined accessor: one argument sets, none is not exposed.
            .method("tint", Arity::AtLeast(1), |label, args| {
                let tint = String::from_value(&args[0]).map_err(|m| mismatch("tint", m))?;
                label.tint.set_silent(tint);
                Ok(Value::Nil)
            })
    }
}

fn mismatch(selector: &str, m: TypeMismatch) -> Error {
    Error::InvalidArgument {
        selector: selector.to_string(),
        expected: m.expected,
        got: m.got,
    }
}

/// An appearance-style proxy: it exposes nothing, accepts any setter and
/// records what it was sent.
pub struct Appearance {
    base: TargetBase,
    pub received: Mutex<Vec<(String, Vec<Value>)>>,
}

static APPEARANCE: TargetType = TargetType::new("Appearance", &[]);

impl Appearance {
    pub fn shared() -> (Arc<Appearance>, TargetRef) {
        let appearance = Arc::new(Self {
            base: TargetBase::new(),
            received: Mutex::new(Vec::new()),
        });
        let target: TargetRef = appearance.clone();
        (appearance, target)
    }

    pub fn selectors(&self) -> Vec<String> {
        self.received
            .lock()
            .unwrap()
            .iter()
            .map(|(selector, _)| selector.clone())
            .collect()
    }
}

impl Target for Appearance {
    fn id(&self) -> TargetId {
        self.base.id()
    }

    fn target_type(&self) -> &'static TargetType {
        &APPEARANCE
    }

    fn meta(&self) -> &TargetMeta {
        self.base.meta()
    }

    fn arity_of(&self, _selector: &str) -> Option<Arity> {
        None
    }

    fn send(&self, selector: &str, args: &[Value]) -> trellis::Result<Value> {
        self.received
            .lock()
            .unwrap()
            .push((selector.to_string(), args.to_vec()));
        Ok(Value::Nil)
    }

    fn applies_deferred(&self) -> bool {
        true
    }
}
