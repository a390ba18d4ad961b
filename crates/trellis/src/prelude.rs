//! Prelude module for Trellis.
//!
//! ```ignore
//! use trellis::prelude::*;
//! ```
//!
//! This provides access to:
//! - Sessions and their configuration (`Session`, `SessionBuilder`)
//! - The target model (`Target`, `TargetBase`, `TargetRef`, `Property`)
//! - Values and argument macros (`Value`, `KeywordArgs`, `args!`, `kwargs!`)
//! - Capability providers (`CapabilityRegistry`, `ProviderMethods`)

// ============================================================================
// Sessions
// ============================================================================

pub use crate::{
    Block, ContextTarget, LifecycleState, ParentLink, Session, SessionBuilder, SessionConfig,
};

// ============================================================================
// Target Model
// ============================================================================

pub use crate::{
    Arity, MethodTable, Property, Target, TargetBase, TargetId, TargetRef, TargetType,
    target_cast,
};

// ============================================================================
// Values
// ============================================================================

pub use crate::{FromValue, KeywordArgs, Value, args, kwargs};

// ============================================================================
// Capability Providers
// ============================================================================

pub use crate::{CapabilityProvider, CapabilityRegistry, ProviderMethods};

// ============================================================================
// Naming and Errors
// ============================================================================

pub use crate::{CamelCase, Error, NamingConvention, Result};
