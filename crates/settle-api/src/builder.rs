//! Fluent tree construction
//!
//! Builders only collect declarations. [`BranchBuilder::build`] creates the
//! nodes and attaches them through the ordinary collection API, so a built
//! tree obeys exactly the same invariants as a hand-assembled one.
//!
//! ```rust
//! use settle_api::TreeBuilder;
//! use settle_schema::{config_types, EnumType, SerializableType, Value};
//!
//! let tree = TreeBuilder::named("server")
//!     .leaf("enabled", SerializableType::Boolean, true)
//!     .typed_leaf("port", &config_types::natural(), &8080)
//!     .branch("tls", |tls| {
//!         tls.leaf_with("mode", EnumType::new(["STRICT", "LAX"]).unwrap(), |leaf| {
//!             leaf.default_value("STRICT").comment("certificate checking")
//!         })
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mode = tree.lookup_leaf(&"tls.mode".parse().unwrap()).unwrap();
//! assert_eq!(mode.value(), Some(Value::from("STRICT")));
//! ```

use settle_schema::{ConfigType, ConversionError, SerializableType, Value};
use settle_tree::{ConfigBranch, ConfigLeaf, ConfigNode};
use tracing::debug;

use crate::error::BuildError;

/// Entry points for building trees
#[derive(Debug, Clone, Copy)]
pub struct TreeBuilder;

impl TreeBuilder {
    /// Builder for an unnamed root branch
    #[must_use]
    pub fn root() -> BranchBuilder {
        BranchBuilder::new(None)
    }

    /// Builder for a named branch
    #[must_use]
    pub fn named(name: impl Into<String>) -> BranchBuilder {
        BranchBuilder::new(Some(name.into()))
    }
}

#[derive(Debug)]
enum Child {
    Leaf {
        name: String,
        ty: SerializableType,
        settings: LeafBuilder,
    },
    Branch(BranchBuilder),
    Node(ConfigNode),
}

/// Declarations for one branch and its subtree
#[derive(Debug)]
#[must_use]
pub struct BranchBuilder {
    name: Option<String>,
    comment: Option<String>,
    separately: bool,
    children: Vec<Child>,
}

impl BranchBuilder {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            comment: None,
            separately: false,
            children: Vec::new(),
        }
    }

    /// Comment on this branch
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Flag this branch for separate serialization
    pub fn serialize_separately(mut self) -> Self {
        self.separately = true;
        self
    }

    /// Leaf with a default value
    pub fn leaf(self, name: impl Into<String>, ty: impl Into<SerializableType>, default: impl Into<Value>) -> Self {
        let default = default.into();
        self.leaf_with(name, ty, |leaf| leaf.default_value(default))
    }

    /// Leaf configured through a [`LeafBuilder`]
    pub fn leaf_with(
        mut self,
        name: impl Into<String>,
        ty: impl Into<SerializableType>,
        configure: impl FnOnce(LeafBuilder) -> LeafBuilder,
    ) -> Self {
        self.children.push(Child::Leaf {
            name: name.into(),
            ty: ty.into(),
            settings: configure(LeafBuilder::default()),
        });
        self
    }

    /// Leaf typed by a config type, with a runtime default
    pub fn typed_leaf<R: 'static>(self, name: impl Into<String>, ty: &ConfigType<R>, default: &R) -> Self {
        let converted = ty.to_serialized(default);
        self.leaf_with(name, ty.serialized_type().clone(), |leaf| LeafBuilder {
            default: Some(converted),
            ..leaf
        })
    }

    /// Nested branch
    pub fn branch(mut self, name: impl Into<String>, configure: impl FnOnce(BranchBuilder) -> BranchBuilder) -> Self {
        self.children
            .push(Child::Branch(configure(BranchBuilder::new(Some(name.into())))));
        self
    }

    /// Attach an existing detached node
    pub fn node(mut self, node: impl Into<ConfigNode>) -> Self {
        self.children.push(Child::Node(node.into()));
        self
    }

    /// Create the branch and its subtree
    ///
    /// # Errors
    /// - `Tree` for duplicate names, attached nodes or rejected defaults
    /// - `DefaultConversion` if a typed default does not convert
    pub fn build(self) -> Result<ConfigBranch, BuildError> {
        let branch = match &self.name {
            Some(name) => ConfigBranch::new(name.clone()),
            None => ConfigBranch::root(),
        };
        self.build_into(&branch)?;
        Ok(branch)
    }

    /// Declare this builder's children and flags on an existing branch
    ///
    /// The builder's own name is ignored.
    ///
    /// # Errors
    /// Same as [`BranchBuilder::build`]; children attached before the
    /// failure stay attached
    pub fn build_into(self, branch: &ConfigBranch) -> Result<(), BuildError> {
        if self.comment.is_some() {
            branch.set_comment(self.comment);
        }
        if self.separately {
            branch.set_serialize_separately(true);
        }

        let children = branch.children();
        for child in self.children {
            let node = match child {
                Child::Leaf { name, ty, settings } => settings.build(name, ty)?.into(),
                Child::Branch(builder) => builder.build()?.into(),
                Child::Node(node) => node,
            };
            children.add(node, false)?;
        }
        debug!(branch = ?branch.name(), children = children.len(), "built branch");
        Ok(())
    }
}

/// Optional settings for one leaf
#[derive(Debug, Default)]
#[must_use]
pub struct LeafBuilder {
    default: Option<Result<Value, ConversionError>>,
    comment: Option<String>,
}

impl LeafBuilder {
    /// Default value, returned until the first write
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(Ok(value.into()));
        self
    }

    /// Comment on this leaf
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    fn build(self, name: String, ty: SerializableType) -> Result<ConfigLeaf, BuildError> {
        let default = self
            .default
            .transpose()
            .map_err(|source| BuildError::DefaultConversion {
                name: name.clone(),
                source,
            })?;
        let leaf = ConfigLeaf::new(name, ty, default)?;
        if self.comment.is_some() {
            leaf.set_comment(self.comment);
        }
        Ok(leaf)
    }
}
