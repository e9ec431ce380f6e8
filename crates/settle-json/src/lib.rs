//! Settle JSON
//!
//! JSON adapter for configuration trees.
//!
//! Leaves are encoded through their declared type, so maps and records
//! both become objects and enum tokens become strings. Applying a document
//! goes through the ordinary leaf write path: values are corrected or
//! refused exactly as a direct write would be.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use settle_json::JsonTreeSerializer;
//! use settle_schema::{SerializableType, Value};
//! use settle_tree::{ConfigBranch, ConfigLeaf};
//!
//! let root = ConfigBranch::root();
//! let verbose = ConfigLeaf::new("verbose", SerializableType::Boolean, Some(Value::Bool(false))).unwrap();
//! root.children().add(verbose.clone().into(), false).unwrap();
//!
//! let serializer = JsonTreeSerializer::default();
//! let leftovers = serializer.apply_json(&root, &json!({"verbose": true, "colour": "red"})).unwrap();
//!
//! assert_eq!(verbose.value(), Some(Value::Bool(true)));
//! assert_eq!(leftovers.unknown.get("colour"), Some(&json!("red")));
//! ```

#![warn(missing_docs)]

mod codec;
mod error;
mod options;
mod serializer;

// Re-exports
pub use error::{SerializeError, SerializeResult};
pub use options::SerializerOptions;
pub use serializer::{JsonTreeSerializer, Leftovers};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
