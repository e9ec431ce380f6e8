//! Settle Tree
//!
//! Validated configuration node tree.
//!
//! # Overview
//!
//! - **ConfigLeaf**: one typed value with default, listeners and comment
//! - **ConfigBranch**: uniquely named children
//! - **NodeCollection**: the branch's child index; sole owner of parent links
//! - **PropertyMirror**: typed proxy over a rebindable delegate leaf
//! - **Property**: value access shared by leaves and mirrors
//!
//! # Example
//!
//! ```rust
//! use settle_schema::{EnumType, Value};
//! use settle_tree::{ConfigBranch, ConfigLeaf};
//!
//! let root = ConfigBranch::new("root");
//! let mode = ConfigLeaf::new("mode", EnumType::new(["A", "B"]).unwrap().into(), None).unwrap();
//! root.children().add(mode.clone().into(), false).unwrap();
//!
//! assert!(mode.set_value(Value::from("b")));
//! assert_eq!(mode.value(), Some(Value::from("B")));
//! assert!(!mode.set_value(Value::from("C")));
//! ```

#![warn(missing_docs)]

mod branch;
mod collection;
mod error;
mod leaf;
mod mirror;
mod node;
mod path;
mod property;

// Re-exports
pub use branch::ConfigBranch;
pub use collection::{CollectionCursor, NodeCollection};
pub use error::{MirrorError, TreeError, TreeResult};
pub use leaf::{ConfigLeaf, ListenerId};
pub use mirror::PropertyMirror;
pub use node::ConfigNode;
pub use path::{NodePath, PathError};
pub use property::Property;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for tree operations
    pub use crate::{
        ConfigBranch, ConfigLeaf, ConfigNode, NodeCollection, NodePath, Property, PropertyMirror,
        TreeError,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
