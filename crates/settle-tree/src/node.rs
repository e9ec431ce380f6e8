//! Common node identity
//!
//! A node is either a [`ConfigLeaf`] or a [`ConfigBranch`]. Both are cheap
//! handles; cloning one yields another handle to the same node, and
//! identity is pointer identity.
//!
//! The parent back-reference is weak and is written only by
//! [`NodeCollection`](crate::NodeCollection), never by the node itself.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::branch::{BranchNode, ConfigBranch};
use crate::leaf::ConfigLeaf;
use crate::path::NodePath;

/// Non-owning reference to the owning branch
#[derive(Debug, Default)]
pub(crate) struct ParentSlot(RwLock<Option<Weak<BranchNode>>>);

impl ParentSlot {
    pub(crate) fn get(&self) -> Option<Arc<BranchNode>> {
        self.0.read().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set(&self, parent: Option<&Arc<BranchNode>>) {
        *self.0.write() = parent.map(Arc::downgrade);
    }
}

/// Any node of the tree
#[derive(Debug, Clone)]
pub enum ConfigNode {
    /// Typed value holder
    Leaf(ConfigLeaf),
    /// Named children
    Branch(ConfigBranch),
}

impl ConfigNode {
    /// Node name; `None` only for unnamed roots
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => Some(leaf.name()),
            Self::Branch(branch) => branch.name(),
        }
    }

    /// Owning branch, if attached
    #[must_use]
    pub fn parent(&self) -> Option<ConfigBranch> {
        match self {
            Self::Leaf(leaf) => leaf.parent(),
            Self::Branch(branch) => branch.parent(),
        }
    }

    /// Remove this node from its parent; no-op when unattached
    pub fn detach(&self) {
        match self {
            Self::Leaf(leaf) => leaf.detach(),
            Self::Branch(branch) => branch.detach(),
        }
    }

    /// Path from the topmost ancestor to this node
    #[must_use]
    pub fn path(&self) -> NodePath {
        match self {
            Self::Leaf(leaf) => leaf.path(),
            Self::Branch(branch) => branch.path(),
        }
    }

    /// Both handles refer to the same node
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => a.ptr_eq(b),
            (Self::Branch(a), Self::Branch(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Leaf handle, if this is a leaf
    #[inline]
    #[must_use]
    pub fn as_leaf(&self) -> Option<&ConfigLeaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Branch(_) => None,
        }
    }

    /// Branch handle, if this is a branch
    #[inline]
    #[must_use]
    pub fn as_branch(&self) -> Option<&ConfigBranch> {
        match self {
            Self::Branch(branch) => Some(branch),
            Self::Leaf(_) => None,
        }
    }

    pub(crate) fn parent_slot(&self) -> &ParentSlot {
        match self {
            Self::Leaf(leaf) => leaf.parent_slot(),
            Self::Branch(branch) => branch.parent_slot(),
        }
    }
}

impl From<ConfigLeaf> for ConfigNode {
    fn from(leaf: ConfigLeaf) -> Self {
        Self::Leaf(leaf)
    }
}

impl From<ConfigBranch> for ConfigNode {
    fn from(branch: ConfigBranch) -> Self {
        Self::Branch(branch)
    }
}

/// Path of a node named `name` below `parent`
pub(crate) fn path_below(parent: Option<ConfigBranch>, name: Option<&str>) -> NodePath {
    let base = parent.map(|p| p.path()).unwrap_or_default();
    match name {
        Some(name) => base.child(name),
        None => base,
    }
}
