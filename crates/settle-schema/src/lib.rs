//! Settle Schema
//!
//! Serializable value types, constraint checking and comprehension.
//!
//! # Overview
//!
//! - **Value**: the serialized form every type checks
//! - **SerializableType**: closed union of constrained kinds
//! - **TypeCheckResult**: accepted, corrected or unrecoverable
//! - **ConfigType**: a serializable type plus runtime conversions
//!
//! # Example
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use settle_schema::{DecimalType, SerializableType, TypeCheckResult, Value};
//!
//! let ty: SerializableType = DecimalType::new(
//!     Some(Decimal::ZERO),
//!     Some(Decimal::TEN),
//!     Some(Decimal::from(3)),
//! )
//! .unwrap()
//! .into();
//!
//! assert_eq!(ty.test(&Value::from(7)), TypeCheckResult::Corrected(Value::from(6)));
//! assert!(ty.test(&Value::from(11)).is_unrecoverable());
//! ```

#![warn(missing_docs)]

mod check;
mod config_type;
pub mod config_types;
mod error;
pub mod types;
mod value;

// Re-exports
pub use check::TypeCheckResult;
pub use config_type::ConfigType;
pub use config_types::ConfigEnum;
pub use error::{ConversionError, SchemaError};
pub use types::{
    DecimalType, EnumType, ListType, MapType, RecordType, SerializableType, StringType, TypeKind,
    TypeVisitor,
};
pub use value::{Value, ValueKind};

pub use rust_decimal::Decimal;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for schema declarations
    pub use crate::{
        config_types, ConfigType, ConversionError, Decimal, DecimalType, EnumType, ListType,
        MapType, RecordType, SchemaError, SerializableType, StringType, TypeCheckResult, Value,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
