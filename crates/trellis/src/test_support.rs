//! Targets shared by the unit tests.

use std::sync::Arc;

use trellis_core::{
    Arity, Error, MethodTable, Property, TargetBase, TargetRef, Value,
};
use trellis_macros::Target;

#[derive(Target)]
pub(crate) struct Pane {
    base: TargetBase,

    #[style]
    alpha: Property<f64>,

    #[style]
    corner_radius: Property<f64>,

    #[style]
    root: Property<String>,
}

impl Pane {
    pub(crate) fn shared() -> TargetRef {
        Arc::new(Self {
            base: TargetBase::new(),
            alpha: Property::new(1.0),
            corner_radius: Property::new(0.0),
            root: Property::new(String::new()),
        })
    }
}

#[derive(Target)]
#[target(extends = "Control, View", methods = "slider_methods")]
pub(crate) struct Slider {
    base: TargetBase,
    value: Property<f64>,
}

impl Slider {
    pub(crate) fn shared() -> TargetRef {
        Arc::new(Self {
            base: TargetBase::new(),
            value: Property::new(0.0),
        })
    }

    fn slider_methods(table: MethodTable<Self>) -> MethodTable<Self> {
        table
            .getter("value", |slider: &Slider| slider.value.get())
            .method("setValue", Arity::Exact(1), |slider, args| {
                let value = match args[0] {
                    Value::Float(v) => v,
                    Value::Int(v) => v as f64,
                    ref other => {
                        return Err(Error::InvalidArgument {
                            selector: "setValue".into(),
                            expected: "float",
                            got: other.kind(),
                        });
                    }
                };
                if !(0.0..=1.0).contains(&value) {
                    return Err(Error::operation(format!("value out of range: {value}")));
                }
                slider.value.set_silent(value);
                Ok(Value::Nil)
            })
    }
}
