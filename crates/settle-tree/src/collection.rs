//! Name-unique child collections
//!
//! [`NodeCollection`] is the only writer of parent back-references. Every
//! mutation updates the index and the child's parent together, so at every
//! observable point a node's parent is a branch iff the branch lists it.
//!
//! Structural removal always happens before the back-reference is cleared,
//! which keeps `detach` → `remove` from recursing.

use std::sync::Arc;

use settle_schema::Value;
use tracing::debug;

use crate::branch::{BranchNode, ConfigBranch};
use crate::error::{TreeError, TreeResult};
use crate::node::ConfigNode;

/// Children of one branch, keyed by name in insertion order
///
/// Cheap handle; obtained from [`ConfigBranch::children`].
#[derive(Clone)]
pub struct NodeCollection {
    owner: Arc<BranchNode>,
}

impl NodeCollection {
    pub(crate) fn new(owner: Arc<BranchNode>) -> Self {
        Self { owner }
    }

    /// Branch owning this collection
    #[must_use]
    pub fn owner(&self) -> ConfigBranch {
        ConfigBranch::from_node(Arc::clone(&self.owner))
    }

    /// Add a child
    ///
    /// Adding a node that is already a child of this branch is a no-op.
    /// With `overwrite`, a different child of the same name is detached and
    /// returned; the new node keeps the old one's position.
    ///
    /// # Errors
    /// - `UnnamedNode` if the node has no name
    /// - `AlreadyAttached` if the node belongs to another branch
    /// - `WouldCreateCycle` if the node is this branch or one of its ancestors
    /// - `DuplicateChild` if the name is taken and `overwrite` is false
    pub fn add(&self, node: ConfigNode, overwrite: bool) -> TreeResult<Option<ConfigNode>> {
        let name = node.name().ok_or(TreeError::UnnamedNode)?.to_string();

        if let Some(parent) = node.parent_slot().get() {
            if Arc::ptr_eq(&parent, &self.owner) {
                return Ok(None);
            }
            return Err(TreeError::AlreadyAttached {
                name,
                parent: ConfigBranch::from_node(parent).display_name(),
            });
        }

        if let ConfigNode::Branch(branch) = &node {
            if branch.is_ancestor_or_self(&self.owner) {
                return Err(TreeError::WouldCreateCycle { name });
            }
        }

        let mut children = self.owner.children.write();
        if !overwrite && children.contains_key(&name) {
            return Err(TreeError::DuplicateChild {
                name,
                parent: self.owner_name(),
            });
        }

        node.parent_slot().set(Some(&self.owner));
        let displaced = children.insert(name.clone(), node);
        if let Some(old) = &displaced {
            old.parent_slot().set(None);
            debug!(parent = %self.owner_name(), child = %name, "replaced child");
        } else {
            debug!(parent = %self.owner_name(), child = %name, "attached child");
        }
        Ok(displaced)
    }

    /// Add a child, detaching any same-named child
    ///
    /// # Errors
    /// Same as [`NodeCollection::add`], minus `DuplicateChild`
    #[inline]
    pub fn replace(&self, node: ConfigNode) -> TreeResult<Option<ConfigNode>> {
        self.add(node, true)
    }

    /// Remove a child; returns whether it was present
    pub fn remove(&self, node: &ConfigNode) -> bool {
        let Some(name) = node.name() else {
            return false;
        };
        let mut children = self.owner.children.write();
        match children.get(name) {
            Some(existing) if existing.ptr_eq(node) => {}
            _ => return false,
        }
        children.shift_remove(name);
        node.parent_slot().set(None);
        debug!(parent = %self.owner_name(), child = %name, "detached child");
        true
    }

    /// Remove the child with this name, if any
    pub fn remove_by_name(&self, name: &str) -> Option<ConfigNode> {
        let removed = self.owner.children.write().shift_remove(name)?;
        removed.parent_slot().set(None);
        debug!(parent = %self.owner_name(), child = %name, "detached child");
        Some(removed)
    }

    /// Detach every child
    pub fn clear(&self) {
        let removed: Vec<ConfigNode> = self.owner.children.write().drain(..).map(|(_, node)| node).collect();
        for node in &removed {
            node.parent_slot().set(None);
        }
        if !removed.is_empty() {
            debug!(parent = %self.owner_name(), count = removed.len(), "cleared children");
        }
    }

    /// Child with this name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ConfigNode> {
        self.owner.children.read().get(name).cloned()
    }

    /// This exact node is a child
    #[must_use]
    pub fn contains(&self, node: &ConfigNode) -> bool {
        node.name()
            .and_then(|name| self.get(name))
            .is_some_and(|existing| existing.ptr_eq(node))
    }

    /// Some child has this name
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.owner.children.read().contains_key(name)
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.owner.children.read().len()
    }

    /// No children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owner.children.read().is_empty()
    }

    /// Child names in order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.owner.children.read().keys().cloned().collect()
    }

    /// Snapshot of the children in order
    #[must_use]
    pub fn nodes(&self) -> Vec<ConfigNode> {
        self.owner.children.read().values().cloned().collect()
    }

    /// Current values of the leaf children, by name
    #[must_use]
    pub fn leaf_values(&self) -> Vec<(String, Option<Value>)> {
        self.owner
            .children
            .read()
            .iter()
            .filter_map(|(name, node)| Some((name.clone(), node.as_leaf()?.value())))
            .collect()
    }

    /// Iterate the children, allowing removal of the current one
    #[must_use]
    pub fn cursor(&self) -> CollectionCursor {
        CollectionCursor {
            collection: self.clone(),
            position: 0,
            current: None,
        }
    }

    fn owner_name(&self) -> String {
        self.owner().display_name()
    }
}

impl IntoIterator for &NodeCollection {
    type Item = ConfigNode;
    type IntoIter = std::vec::IntoIter<ConfigNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes().into_iter()
    }
}

/// Positional iterator over a [`NodeCollection`]
///
/// [`CollectionCursor::remove_current`] removes the node last returned by
/// `next` without disturbing the iteration. Removing other children while
/// iterating may skip or repeat nodes.
pub struct CollectionCursor {
    collection: NodeCollection,
    position: usize,
    current: Option<ConfigNode>,
}

impl CollectionCursor {
    /// Remove the node last returned by `next`
    ///
    /// Returns false if there is none, or it was already removed.
    pub fn remove_current(&mut self) -> bool {
        let Some(node) = self.current.take() else {
            return false;
        };
        let removed = self.collection.remove(&node);
        if removed {
            self.position -= 1;
        }
        removed
    }
}

impl Iterator for CollectionCursor {
    type Item = ConfigNode;

    fn next(&mut self) -> Option<ConfigNode> {
        let node = self
            .collection
            .owner
            .children
            .read()
            .get_index(self.position)
            .map(|(_, node)| node.clone())?;
        self.position += 1;
        self.current = Some(node.clone());
        Some(node)
    }
}
