//! Naming conventions.
//!
//! Callers write word_separated names; targets expose camelCase selectors.
//! A [`NamingConvention`] translates between the two and spells the derived
//! selectors the dispatch resolver tries (setter, assignment, long form).
//!
//! ```
//! use trellis_core::naming::{CamelCase, NamingConvention};
//!
//! let naming = CamelCase;
//! assert_eq!(naming.translate("corner_radius"), "cornerRadius");
//! assert_eq!(naming.setter("cornerRadius"), "setCornerRadius");
//! assert_eq!(naming.assignment("cornerRadius"), "cornerRadius=");
//! assert_eq!(naming.long_form("setTitle", &["forState"]), "setTitle:forState:");
//! ```

/// Translates caller-facing names into target selectors.
pub trait NamingConvention: Send + Sync {
    /// Convert a word_separated name into the native spelling.
    fn translate(&self, name: &str) -> String;

    /// Whether `name` is word separated and worth translating.
    fn is_word_separated(&self, name: &str) -> bool {
        name.contains('_')
    }

    /// The setter spelling for `name`.
    fn setter(&self, name: &str) -> String {
        setter_name(name)
    }

    /// The assignment spelling for `name`.
    fn assignment(&self, name: &str) -> String {
        format!("{name}=")
    }

    /// The single-argument selector spelling for `name`.
    fn selector(&self, name: &str) -> String {
        format!("{name}:")
    }

    /// The long-form selector combining `name` with keyword `keys`.
    fn long_form(&self, name: &str, keys: &[&str]) -> String {
        let mut selector = name.to_string();
        for key in keys {
            selector.push(':');
            selector.push_str(key);
        }
        selector.push(':');
        selector
    }
}

/// The default convention: `word_separated` becomes `wordSeparated`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CamelCase;

impl NamingConvention for CamelCase {
    fn translate(&self, name: &str) -> String {
        camel_case(name)
    }
}

/// Convert `word_separated` into `wordSeparated`.
///
/// The first segment is kept as written and every later segment has its
/// first character upper-cased. Empty segments are dropped after the first.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut first = true;
    for segment in name.split('_') {
        if first {
            out.push_str(segment);
            first = false;
        } else {
            out.push_str(&capitalize(segment));
        }
    }
    out
}

/// Spell the setter for `name`: `cornerRadius` becomes `setCornerRadius`.
pub fn setter_name(name: &str) -> String {
    format!("set{}", capitalize(name))
}

/// Upper-case the first character of `s`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("corner_radius"), "cornerRadius");
        assert_eq!(camel_case("background_color_for_state"), "backgroundColorForState");
        assert_eq!(camel_case("alpha"), "alpha");
        assert_eq!(camel_case("already_camelCase"), "alreadyCamelCase");
    }

    #[test]
    fn test_camel_case_edge_segments() {
        assert_eq!(camel_case("_private"), "Private");
        assert_eq!(camel_case("double__underscore"), "doubleUnderscore");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_setter_name() {
        assert_eq!(setter_name("alpha"), "setAlpha");
        assert_eq!(setter_name("cornerRadius"), "setCornerRadius");
        assert_eq!(setter_name("corner_radius"), "setCorner_radius");
    }

    #[test]
    fn test_long_form() {
        let naming = CamelCase;
        assert_eq!(naming.long_form("foo", &["a", "b"]), "foo:a:b:");
        assert_eq!(naming.selector("layer"), "layer:");
    }

    #[test]
    fn test_word_separated() {
        let naming = CamelCase;
        assert!(naming.is_word_separated("corner_radius"));
        assert!(!naming.is_word_separated("cornerRadius"));
    }
}
