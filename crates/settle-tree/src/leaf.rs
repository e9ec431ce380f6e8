//! Leaf nodes
//!
//! A [`ConfigLeaf`] is either *unset* (reads return the default) or *set*.
//! Every write goes through the leaf's [`SerializableType`]: accepted values
//! are stored as given, corrected values are stored in their corrected form,
//! and unrecoverable values leave the leaf untouched.
//!
//! # Listener contract
//! - listeners run in registration order, each to completion
//! - a listener sees only changes that began after it was registered
//! - a write made from inside a listener is stored at once, but its
//!   notification is queued behind the one in flight. Listeners still to
//!   run for the in-flight change are handed its `(old, new)` pair, yet
//!   [`ConfigLeaf::value`] already returns the newer value
//! - a panicking listener aborts delivery of that change only; later
//!   writes notify as usual

use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockWriteGuard};
use settle_schema::{SerializableType, TypeCheckResult, Value};
use tracing::{debug, trace};

use crate::branch::ConfigBranch;
use crate::error::{TreeError, TreeResult};
use crate::node::{path_below, ConfigNode, ParentSlot};
use crate::path::NodePath;

type Listener = Arc<dyn Fn(Option<&Value>, Option<&Value>) + Send + Sync>;

/// Handle returned by [`ConfigLeaf::add_change_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

struct LeafNode {
    name: String,
    ty: SerializableType,
    default: Option<Value>,
    parent: ParentSlot,
    state: RwLock<LeafState>,
}

#[derive(Default)]
struct LeafState {
    value: Option<Value>,
    comment: Option<String>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    pending: VecDeque<Change>,
    dispatching: bool,
}

struct Change {
    old: Option<Value>,
    new: Option<Value>,
    /// Listeners with a smaller id were registered before the change began
    watermark: u64,
}

/// Handle to a typed leaf node
#[derive(Clone)]
pub struct ConfigLeaf {
    node: Arc<LeafNode>,
}

impl ConfigLeaf {
    /// Create a detached, unset leaf
    ///
    /// # Errors
    /// - `UnnamedNode` if `name` is empty
    /// - `InvalidDefault` if `default` is not accepted by `ty` as given
    pub fn new(name: impl Into<String>, ty: SerializableType, default: Option<Value>) -> TreeResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(TreeError::UnnamedNode);
        }
        if let Some(value) = &default {
            if !ty.accepts(value) {
                return Err(TreeError::InvalidDefault {
                    name,
                    value: value.to_string(),
                    ty: ty.to_string(),
                });
            }
        }
        Ok(Self {
            node: Arc::new(LeafNode {
                name,
                ty,
                default,
                parent: ParentSlot::default(),
                state: RwLock::new(LeafState::default()),
            }),
        })
    }

    /// Leaf name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Type every stored value satisfies
    #[inline]
    #[must_use]
    pub fn serialized_type(&self) -> &SerializableType {
        &self.node.ty
    }

    /// Default value, returned while unset
    #[inline]
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.node.default.as_ref()
    }

    /// Current value, or the default while unset
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        self.node
            .state
            .read()
            .value
            .clone()
            .or_else(|| self.node.default.clone())
    }

    /// A value has been written since creation or the last reset
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.node.state.read().value.is_some()
    }

    /// Test a value against this leaf's type without storing it
    pub fn test(&self, value: &Value) -> TypeCheckResult {
        self.node.ty.test(value)
    }

    /// Value would be stored unchanged
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        self.node.ty.accepts(value)
    }

    /// Write a value
    ///
    /// Returns true if a value (possibly corrected) was stored and listeners
    /// were notified, false if the value is unrecoverable.
    pub fn set_value(&self, value: Value) -> bool {
        let stored = match self.node.ty.test(&value) {
            TypeCheckResult::Accepted => value,
            TypeCheckResult::Corrected(fixed) => {
                trace!(leaf = %self.name(), from = %value, to = %fixed, "corrected write");
                fixed
            }
            TypeCheckResult::Unrecoverable => {
                debug!(leaf = %self.name(), value = %value, ty = %self.node.ty, "rejected write");
                return false;
            }
        };

        let mut state = self.node.state.write();
        let old = state.value.replace(stored.clone()).or_else(|| self.node.default.clone());
        let watermark = state.next_listener;
        self.publish(
            state,
            Change {
                old,
                new: Some(stored),
                watermark,
            },
        );
        true
    }

    /// Return to the unset state
    ///
    /// Listeners are notified only if the visible value changes.
    pub fn reset(&self) {
        let mut state = self.node.state.write();
        let Some(previous) = state.value.take() else {
            return;
        };
        if self.node.default.as_ref() == Some(&previous) {
            return;
        }
        let watermark = state.next_listener;
        self.publish(
            state,
            Change {
                old: Some(previous),
                new: self.node.default.clone(),
                watermark,
            },
        );
    }

    /// Register a listener called with `(old, new)` after every change
    pub fn add_change_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Option<&Value>, Option<&Value>) + Send + Sync + 'static,
    {
        let mut state = self.node.state.write();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Unregister a listener; returns whether it was registered
    ///
    /// A notification already being delivered still reaches it.
    pub fn remove_change_listener(&self, id: ListenerId) -> bool {
        let mut state = self.node.state.write();
        let before = state.listeners.len();
        state.listeners.retain(|(registered, _)| *registered != id);
        state.listeners.len() != before
    }

    /// Free-form comment
    #[must_use]
    pub fn comment(&self) -> Option<String> {
        self.node.state.read().comment.clone()
    }

    /// Replace the comment
    pub fn set_comment(&self, comment: Option<String>) {
        self.node.state.write().comment = comment;
    }

    /// Owning branch, if attached
    #[must_use]
    pub fn parent(&self) -> Option<ConfigBranch> {
        self.node.parent.get().map(ConfigBranch::from_node)
    }

    /// Remove this leaf from its parent; no-op when unattached
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.children().remove(&ConfigNode::Leaf(self.clone()));
        }
    }

    /// Path from the topmost ancestor to this leaf
    #[must_use]
    pub fn path(&self) -> NodePath {
        path_below(self.parent(), Some(self.name()))
    }

    /// Both handles refer to the same leaf
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    pub(crate) fn parent_slot(&self) -> &ParentSlot {
        &self.node.parent
    }

    /// Queue a change and, unless a dispatch is already running further up
    /// the stack, deliver every queued change in order.
    fn publish(&self, mut state: RwLockWriteGuard<'_, LeafState>, change: Change) {
        state.pending.push_back(change);
        if state.dispatching {
            return;
        }
        state.dispatching = true;
        drop(state);

        let mut dispatch = Dispatch {
            state: &self.node.state,
            finished: false,
        };
        loop {
            let (change, listeners) = {
                let mut state = self.node.state.write();
                let Some(change) = state.pending.pop_front() else {
                    state.dispatching = false;
                    dispatch.finished = true;
                    return;
                };
                let listeners: Vec<Listener> = state
                    .listeners
                    .iter()
                    .filter(|(id, _)| id.0 < change.watermark)
                    .map(|(_, listener)| Arc::clone(listener))
                    .collect();
                (change, listeners)
            };

            trace!(leaf = %self.name(), listeners = listeners.len(), "notifying listeners");
            for listener in &listeners {
                listener(change.old.as_ref(), change.new.as_ref());
            }
        }
    }
}

/// Clears the dispatching flag if a listener unwinds
///
/// Changes still queued stay queued and go out with the next write.
struct Dispatch<'a> {
    state: &'a RwLock<LeafState>,
    finished: bool,
}

impl Drop for Dispatch<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.write().dispatching = false;
        }
    }
}

impl Debug for ConfigLeaf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigLeaf")
            .field("name", &self.node.name)
            .field("type", &self.node.ty)
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}
