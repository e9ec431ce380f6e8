//! Error types for the node tree
//!
//! Structural violations are programmer errors and surface immediately.
//! Constraint violations on leaf writes are not errors: they are reported
//! through `bool` returns.

use settle_schema::ConversionError;

use crate::path::PathError;

/// Structural tree errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A child with this name already exists
    #[error("branch '{parent}' already has a child named '{name}'")]
    DuplicateChild {
        /// Child name
        name: String,
        /// Owning branch
        parent: String,
    },

    /// Node belongs to another branch; detach it first
    #[error("node '{name}' is already attached to '{parent}'")]
    AlreadyAttached {
        /// Node name
        name: String,
        /// Current parent
        parent: String,
    },

    /// Branch would become its own ancestor
    #[error("adding branch '{name}' would create a cycle")]
    WouldCreateCycle {
        /// Branch name
        name: String,
    },

    /// Only roots may be unnamed
    #[error("node has no name")]
    UnnamedNode,

    /// Default value rejected by the leaf's type
    #[error("default {value} of leaf '{name}' is not accepted by {ty}")]
    InvalidDefault {
        /// Leaf name
        name: String,
        /// Rendered default
        value: String,
        /// Rendered type
        ty: String,
    },

    /// Malformed path
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors from [`PropertyMirror`](crate::PropertyMirror)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    /// Operation before `mirror()`
    #[error("mirror is not bound to a delegate leaf")]
    Unbound,

    /// Delegate may hold values the mirror cannot represent
    #[error("mirror type {mirror} does not comprehend delegate type {delegate}")]
    IncompatibleDelegate {
        /// Mirror's serialized type
        mirror: String,
        /// Delegate's serialized type
        delegate: String,
    },

    /// Runtime conversion failed
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

/// Result alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;
