//! Error types for tree construction and binding

use settle_schema::{ConversionError, SchemaError};
use settle_tree::TreeError;

/// Tree construction failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Structural error while assembling the tree
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Typed default outside its config type
    #[error("default of leaf '{name}' does not convert: {source}")]
    DefaultConversion {
        /// Leaf name
        name: String,
        /// Underlying failure
        #[source]
        source: ConversionError,
    },
}

/// Binding failure; always names the offending field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// No config type registered for the field's runtime type
    #[error("field '{field}' of {host}: no config type registered for {runtime}")]
    MissingTypeMapping {
        /// Field name
        field: String,
        /// Host type name
        host: &'static str,
        /// Runtime type name
        runtime: &'static str,
    },

    /// Declared narrowing widens the registered type
    #[error("field '{field}' of {host}: {source}")]
    Narrowing {
        /// Field name
        field: String,
        /// Host type name
        host: &'static str,
        /// Underlying failure
        #[source]
        source: SchemaError,
    },

    /// Current host value is outside the field's type
    #[error("field '{field}' of {host}: {source}")]
    Conversion {
        /// Field name
        field: String,
        /// Host type name
        host: &'static str,
        /// Underlying failure
        #[source]
        source: ConversionError,
    },

    /// Structural error while attaching the bound leaves
    #[error(transparent)]
    Tree(#[from] TreeError),
}
