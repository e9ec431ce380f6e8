//! Branch nodes
//!
//! A [`ConfigBranch`] owns its children through a [`NodeCollection`].

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use settle_schema::{RecordType, SerializableType, Value};

use crate::collection::NodeCollection;
use crate::leaf::ConfigLeaf;
use crate::node::{path_below, ConfigNode, ParentSlot};
use crate::path::NodePath;

pub(crate) struct BranchNode {
    pub(crate) name: Option<String>,
    pub(crate) parent: ParentSlot,
    pub(crate) children: RwLock<IndexMap<String, ConfigNode>>,
    pub(crate) meta: RwLock<BranchMeta>,
}

#[derive(Debug, Default)]
pub(crate) struct BranchMeta {
    pub(crate) serialize_separately: bool,
    pub(crate) comment: Option<String>,
}

/// Handle to a branch node
#[derive(Clone)]
pub struct ConfigBranch {
    node: Arc<BranchNode>,
}

impl ConfigBranch {
    /// Create a named, detached branch
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::create(Some(name.into()))
    }

    /// Create an unnamed root branch
    ///
    /// Unnamed branches cannot be attached below another branch.
    #[must_use]
    pub fn root() -> Self {
        Self::create(None)
    }

    fn create(name: Option<String>) -> Self {
        Self {
            node: Arc::new(BranchNode {
                name,
                parent: ParentSlot::default(),
                children: RwLock::new(IndexMap::new()),
                meta: RwLock::new(BranchMeta::default()),
            }),
        }
    }

    pub(crate) fn from_node(node: Arc<BranchNode>) -> Self {
        Self { node }
    }

    /// Branch name; `None` for unnamed roots
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.node.name.as_deref()
    }

    /// Owning branch, if attached
    #[must_use]
    pub fn parent(&self) -> Option<ConfigBranch> {
        self.node.parent.get().map(Self::from_node)
    }

    /// Remove this branch from its parent; no-op when unattached
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.children().remove(&ConfigNode::Branch(self.clone()));
        }
    }

    /// Children of this branch
    #[inline]
    #[must_use]
    pub fn children(&self) -> NodeCollection {
        NodeCollection::new(Arc::clone(&self.node))
    }

    /// Serializers should write this branch on its own
    #[must_use]
    pub fn is_serialized_separately(&self) -> bool {
        self.node.meta.read().serialize_separately
    }

    /// Set the advisory separate-serialization flag
    pub fn set_serialize_separately(&self, separately: bool) {
        self.node.meta.write().serialize_separately = separately;
    }

    /// Free-form comment
    #[must_use]
    pub fn comment(&self) -> Option<String> {
        self.node.meta.read().comment.clone()
    }

    /// Replace the comment
    pub fn set_comment(&self, comment: Option<String>) {
        self.node.meta.write().comment = comment;
    }

    /// Path from the topmost ancestor to this branch
    #[must_use]
    pub fn path(&self) -> NodePath {
        path_below(self.parent(), self.name())
    }

    /// Resolve a descendant by path; the empty path yields this branch
    #[must_use]
    pub fn lookup(&self, path: &NodePath) -> Option<ConfigNode> {
        let mut current = ConfigNode::Branch(self.clone());
        for segment in path.iter() {
            current = current.as_branch()?.children().get(segment)?;
        }
        Some(current)
    }

    /// Resolve a descendant leaf by path
    #[must_use]
    pub fn lookup_leaf(&self, path: &NodePath) -> Option<ConfigLeaf> {
        match self.lookup(path)? {
            ConfigNode::Leaf(leaf) => Some(leaf),
            ConfigNode::Branch(_) => None,
        }
    }

    /// Check this branch against a record schema
    ///
    /// Every declared field needs a child leaf whose type the field type
    /// comprehends. Record-typed fields may instead be satisfied by a child
    /// branch, recursively. Extra children are allowed.
    #[must_use]
    pub fn satisfies(&self, record: &RecordType) -> bool {
        let children = self.children();
        record.fields().all(|(name, ty)| match children.get(name) {
            Some(ConfigNode::Leaf(leaf)) => ty.comprehends(leaf.serialized_type()),
            Some(ConfigNode::Branch(branch)) => {
                matches!(ty, SerializableType::Record(nested) if branch.satisfies(nested))
            }
            None => false,
        })
    }

    /// Current values as a record, nested branches as nested records
    ///
    /// Leaves with neither a value nor a default are omitted.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let fields = self
            .children()
            .nodes()
            .into_iter()
            .filter_map(|node| {
                let name = node.name()?.to_string();
                let value = match &node {
                    ConfigNode::Leaf(leaf) => leaf.value()?,
                    ConfigNode::Branch(branch) => branch.to_value(),
                };
                Some((name, value))
            })
            .collect();
        Value::Record(fields)
    }

    /// `self` is `other` or one of its ancestors
    pub(crate) fn is_ancestor_or_self(&self, other: &Arc<BranchNode>) -> bool {
        let mut current = Some(Arc::clone(other));
        while let Some(branch) = current {
            if Arc::ptr_eq(&branch, &self.node) {
                return true;
            }
            current = branch.parent.get();
        }
        false
    }

    /// Both handles refer to the same branch
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    pub(crate) fn parent_slot(&self) -> &ParentSlot {
        &self.node.parent
    }

    pub(crate) fn display_name(&self) -> String {
        self.name().unwrap_or("<root>").to_string()
    }
}

impl Debug for ConfigBranch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBranch")
            .field("name", &self.name())
            .field("children", &self.children().names())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_schema::{Decimal, DecimalType, StringType};

    fn text_leaf(name: &str) -> ConfigLeaf {
        ConfigLeaf::new(name, StringType::unbounded().into(), None).unwrap()
    }

    #[test]
    fn lookup_resolves_nested_paths() {
        let root = ConfigBranch::root();
        let server = ConfigBranch::new("server");
        let host = text_leaf("host");
        server.children().add(host.clone().into(), false).unwrap();
        root.children().add(server.clone().into(), false).unwrap();

        let found = root.lookup_leaf(&"server.host".parse().unwrap()).unwrap();
        assert!(found.ptr_eq(&host));
        assert!(root.lookup(&NodePath::root()).unwrap().as_branch().unwrap().ptr_eq(&root));
        assert!(root.lookup(&"server.port".parse().unwrap()).is_none());
        assert!(root.lookup_leaf(&"server".parse().unwrap()).is_none());
    }

    #[test]
    fn path_walks_named_ancestors() {
        let root = ConfigBranch::root();
        let server = ConfigBranch::new("server");
        let host = text_leaf("host");
        server.children().add(host.clone().into(), false).unwrap();
        root.children().add(server.into(), false).unwrap();

        assert_eq!(host.path().to_string(), "server.host");
    }

    #[test]
    fn satisfies_checks_declared_fields() {
        let root = ConfigBranch::root();
        let port_type: SerializableType = DecimalType::ranged(Decimal::ZERO, Decimal::from(65535))
            .unwrap()
            .into();
        let port = ConfigLeaf::new("port", port_type.clone(), None).unwrap();
        root.children().add(port.into(), false).unwrap();
        root.children().add(text_leaf("extra").into(), false).unwrap();

        let record = RecordType::new([("port", port_type)]).unwrap();
        assert!(root.satisfies(&record));

        let wider_host = RecordType::new([("host", StringType::unbounded().into())]).unwrap();
        assert!(!root.satisfies(&wider_host));

        let narrower = RecordType::new([(
            "port",
            DecimalType::ranged(Decimal::ONE, Decimal::TEN).unwrap().into(),
        )])
        .unwrap();
        assert!(!root.satisfies(&narrower));
    }

    #[test]
    fn to_value_nests_branches() {
        let root = ConfigBranch::root();
        let child = ConfigBranch::new("child");
        let name = text_leaf("name");
        name.set_value(Value::from("x"));
        child.children().add(name.into(), false).unwrap();
        root.children().add(child.into(), false).unwrap();
        root.children().add(text_leaf("unset").into(), false).unwrap();

        assert_eq!(
            root.to_value(),
            Value::record([("child", Value::record([("name", Value::from("x"))]))])
        );
    }
}
