//! Error types for Trellis.

use crate::method::Arity;

/// Result type alias for Trellis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building against a target.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// There is no active context and none could be created.
    #[error("No context available: no target is active and no root target could be created")]
    NoContext,

    /// A dispatched call was made while no context was active.
    ///
    /// Reported instead of [`Error::NoContext`] so that a call on a bare
    /// session reads as an ordinary missing method.
    #[error("undefined method `{name}` for session")]
    UndefinedMethod { name: String },

    /// No resolution strategy could apply the operation.
    #[error("Cannot apply {name:?} to instance of {target_type}")]
    Apply {
        name: String,
        target_type: &'static str,
    },

    /// A deferred block was scheduled with no context to run against.
    #[error("Invalid deferred block: no context given, none active, and no root target available")]
    InvalidDeferred,

    /// A block was required but not supplied.
    #[error("Block required")]
    BlockRequired,

    /// The target does not expose the selector.
    #[error("{target_type} does not respond to `{selector}`")]
    Unsupported {
        selector: String,
        target_type: &'static str,
    },

    /// The selector was called with the wrong number of arguments.
    #[error("`{selector}` on {target_type} expects {expected} argument(s), got {got}")]
    ArgumentCount {
        selector: String,
        target_type: &'static str,
        expected: Arity,
        got: usize,
    },

    /// An argument had the wrong type.
    #[error("Invalid argument for `{selector}`: expected {expected}, got {got}")]
    InvalidArgument {
        selector: String,
        expected: &'static str,
        got: &'static str,
    },

    /// A context-switching call returned something other than a target.
    #[error("`{selector}` returned {got}, expected a target to enter")]
    NotATarget { selector: String, got: &'static str },

    /// A token alias did not resolve to a target.
    #[error("No target found for token {token:?}")]
    TargetNotFound { token: String },

    /// Deferred work kept scheduling more work past the configured limit.
    #[error("Deferred queue did not settle after {passes} passes")]
    DeferredOverflow { passes: usize },

    /// A target or provider operation failed.
    #[error("{0}")]
    Operation(String),
}

impl Error {
    /// Create an apply error.
    pub fn apply(name: impl Into<String>, target_type: &'static str) -> Self {
        Self::Apply {
            name: name.into(),
            target_type,
        }
    }

    /// Create an undefined method error.
    pub fn undefined_method(name: impl Into<String>) -> Self {
        Self::UndefinedMethod { name: name.into() }
    }

    /// Create an unsupported selector error.
    pub fn unsupported(selector: impl Into<String>, target_type: &'static str) -> Self {
        Self::Unsupported {
            selector: selector.into(),
            target_type,
        }
    }

    /// Create a free-form operation error.
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation(message.into())
    }

    /// Whether this error means "the operation is not exposed".
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
