//! Settle API
//!
//! Declarative surfaces over the node tree.
//!
//! # Overview
//!
//! - **TreeBuilder**: fluent construction of branches and leaves
//! - **TypeRegistry**: runtime type → config type mapping
//! - **SchemaBinder**: one leaf per declared field of a [`Bindable`] host,
//!   with write-back into the host
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use parking_lot::Mutex;
//! use settle_api::{Bindable, FieldTable, SchemaBinder, TypeRegistry};
//! use settle_schema::Value;
//!
//! struct Limits {
//!     retries: u32,
//! }
//!
//! impl Bindable for Limits {
//!     fn fields() -> FieldTable<Self> {
//!         FieldTable::new().field("retries", |l: &Limits| l.retries, |l, v| l.retries = v)
//!     }
//! }
//!
//! let registry = TypeRegistry::with_defaults();
//! let host = Arc::new(Mutex::new(Limits { retries: 3 }));
//! let branch = SchemaBinder::new(&registry).bind("limits", &host).unwrap();
//!
//! let retries = branch.lookup_leaf(&"retries".parse().unwrap()).unwrap();
//! retries.set_value(Value::from(5));
//! assert_eq!(host.lock().retries, 5);
//! ```

#![warn(missing_docs)]

mod binder;
mod builder;
mod error;
mod registry;

// Re-exports
pub use binder::{Bindable, FieldDescriptor, FieldTable, SchemaBinder};
pub use builder::{BranchBuilder, LeafBuilder, TreeBuilder};
pub use error::{BindError, BuildError};
pub use registry::TypeRegistry;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and binding trees
    pub use crate::{Bindable, FieldTable, SchemaBinder, TreeBuilder, TypeRegistry};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
