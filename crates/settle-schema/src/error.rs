//! Error types for the schema layer
//!
//! Two families:
//! - [`SchemaError`]: a type was declared or derived incorrectly
//! - [`ConversionError`]: a value crossed a typed boundary outside its domain
//!
//! Constraint violations on ordinary writes are not errors; they are
//! reported through [`TypeCheckResult`](crate::TypeCheckResult).

use crate::value::ValueKind;

/// Invalid type declaration or derivation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Lower bound above upper bound
    #[error("invalid bounds: minimum {min} exceeds maximum {max}")]
    InvalidBounds { min: String, max: String },

    /// Increment is zero or negative
    #[error("increment must be positive, got {0}")]
    NonPositiveIncrement(String),

    /// Increment declared without a minimum to anchor the ticks
    #[error("increment {0} requires a minimum")]
    IncrementWithoutMinimum(String),

    /// Enum with no valid tokens
    #[error("enum type requires at least one valid value")]
    EmptyEnum,

    /// Regex pattern failed to compile
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Derivation would accept values the base type rejects
    #[error("cannot widen {current} to {requested}")]
    Widening { current: String, requested: String },

    /// Record declared the same field twice
    #[error("duplicate record field: '{0}'")]
    DuplicateField(String),
}

/// Value outside a typed boundary's domain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Value of the wrong kind
    #[error("expected a {expected} value, got {actual}")]
    KindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Value of the right kind that the serialized type does not accept
    #[error("value {value} violates {ty}")]
    ConstraintViolation { value: String, ty: String },

    /// Value does not fit the runtime representation
    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: &'static str },

    /// Converter-specific failure
    #[error("{0}")]
    Custom(String),
}

impl ConversionError {
    /// Create kind mismatch error
    #[inline]
    #[must_use]
    pub fn kind_mismatch(expected: ValueKind, actual: ValueKind) -> Self {
        Self::KindMismatch { expected, actual }
    }

    /// Create out-of-range error
    #[inline]
    pub fn out_of_range(value: impl ToString, target: &'static str) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            target,
        }
    }
}
