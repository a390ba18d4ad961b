//! Argument construction macros.

/// Build a positional argument list.
///
/// Every element is converted with `Value::from`.
///
/// ```
/// use trellis::{Value, args};
///
/// let args = args![1, "title", 0.5];
/// assert_eq!(args[1], Value::from("title"));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),+]
    };
}

/// Build a keyword mapping as a [`Value::Map`](crate::Value::Map).
///
/// Keys keep the order they are written in, which is the order the long-form
/// selector is spelled in.
///
/// ```
/// use trellis::{args, kwargs};
///
/// let args = args!["Press", kwargs! { forState: "normal" }];
/// assert_eq!(args[1].as_keywords().unwrap().keys().collect::<Vec<_>>(), vec!["forState"]);
/// ```
#[macro_export]
macro_rules! kwargs {
    ($($key:ident : $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut keywords = $crate::KeywordArgs::new();
        $(keywords.insert(::std::stringify!($key), $value);)*
        $crate::Value::from(keywords)
    }};
}

#[cfg(test)]
mod tests {
    use crate::{KeywordArgs, Value};

    #[test]
    fn test_args_converts_elements() {
        let args = args![1, true, "x"];
        assert_eq!(args, vec![Value::Int(1), Value::Bool(true), Value::from("x")]);
        assert!(args![].is_empty());
    }

    #[test]
    fn test_kwargs_preserves_order() {
        let value = kwargs! { zeta: 1, alpha: 2 };
        let keywords: &KeywordArgs = value.as_keywords().unwrap();
        assert_eq!(keywords.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(kwargs! {}, Value::Map(KeywordArgs::new()));
    }
}
