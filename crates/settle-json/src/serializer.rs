//! Tree ↔ JSON document adapter
//!
//! Branches map to JSON objects keyed by child name, in child order.
//! Entries the tree cannot place are handed back as [`Leftovers`] rather
//! than dropped, so the caller decides whether they are errors.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use settle_tree::{ConfigBranch, ConfigLeaf, ConfigNode, NodePath};
use tracing::{debug, warn};

use crate::codec::{json_kind, Decoder, Encoder};
use crate::error::{SerializeError, SerializeResult};
use crate::options::SerializerOptions;

/// Entries of an applied document the tree did not take
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leftovers {
    /// Keys with no matching child, by dotted path
    pub unknown: IndexMap<String, JsonValue>,
    /// Values a leaf or branch refused, by dotted path; the node keeps its
    /// current state
    pub rejected: IndexMap<String, JsonValue>,
}

impl Leftovers {
    /// Everything was applied
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown.is_empty() && self.rejected.is_empty()
    }
}

/// Reads and writes configuration trees as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTreeSerializer {
    options: SerializerOptions,
}

impl JsonTreeSerializer {
    /// Serializer with the given options
    #[inline]
    #[must_use]
    pub fn new(options: SerializerOptions) -> Self {
        Self { options }
    }

    /// Active options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SerializerOptions {
        &self.options
    }

    /// Render `branch` as a JSON object
    ///
    /// Unset leaves without a default are omitted.
    ///
    /// # Errors
    /// Returns `ShapeMismatch` if a stored value cannot be rendered as JSON
    pub fn to_json(&self, branch: &ConfigBranch) -> SerializeResult<JsonValue> {
        self.encode_branch(branch, &NodePath::root())
            .map(JsonValue::Object)
    }

    /// Render `branch` as JSON text
    ///
    /// # Errors
    /// Same as [`JsonTreeSerializer::to_json`]
    pub fn to_string(&self, branch: &ConfigBranch) -> SerializeResult<String> {
        let json = self.to_json(branch)?;
        let text = if self.options.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        };
        Ok(text)
    }

    /// Apply a JSON object to `branch`
    ///
    /// Each key is matched against the branch's children. Leaves take the
    /// decoded value through their normal write path, `null` resets a
    /// leaf, and objects recurse into child branches. Keys with no child,
    /// and separately serialized branches unless enabled, end up in
    /// [`Leftovers::unknown`]. Values a leaf cannot use, and non-object
    /// values given for a branch, end up in [`Leftovers::rejected`]; the
    /// rest of the document is still applied.
    ///
    /// # Errors
    /// Returns `RootNotObject` if `json` is not an object
    pub fn apply_json(&self, branch: &ConfigBranch, json: &JsonValue) -> SerializeResult<Leftovers> {
        let JsonValue::Object(object) = json else {
            return Err(SerializeError::RootNotObject(json_kind(json).to_owned()));
        };
        let mut leftovers = Leftovers::default();
        self.apply_object(branch, object, &NodePath::root(), &mut leftovers);
        debug!(
            unknown = leftovers.unknown.len(),
            rejected = leftovers.rejected.len(),
            "applied document"
        );
        Ok(leftovers)
    }

    /// Parse JSON text and apply it to `branch`
    ///
    /// # Errors
    /// `Json` on malformed text, otherwise as [`JsonTreeSerializer::apply_json`]
    pub fn apply_str(&self, branch: &ConfigBranch, text: &str) -> SerializeResult<Leftovers> {
        let json: JsonValue = serde_json::from_str(text)?;
        self.apply_json(branch, &json)
    }

    fn includes(&self, branch: &ConfigBranch) -> bool {
        self.options.include_separate || !branch.is_serialized_separately()
    }

    fn encode_branch(&self, branch: &ConfigBranch, path: &NodePath) -> SerializeResult<Map<String, JsonValue>> {
        let mut object = Map::new();
        for node in branch.children().nodes() {
            let Some(name) = node.name().map(str::to_owned) else {
                continue;
            };
            let path = path.child(name.as_str());
            match &node {
                ConfigNode::Leaf(leaf) => {
                    if !self.options.include_defaults && !leaf.is_set() {
                        continue;
                    }
                    let Some(value) = leaf.value() else {
                        continue;
                    };
                    let json = Encoder::encode(leaf.serialized_type(), &value, path.to_string())?;
                    object.insert(name, json);
                }
                ConfigNode::Branch(child) if self.includes(child) => {
                    object.insert(name, JsonValue::Object(self.encode_branch(child, &path)?));
                }
                ConfigNode::Branch(_) => {}
            }
        }
        Ok(object)
    }

    fn apply_object(
        &self,
        branch: &ConfigBranch,
        object: &Map<String, JsonValue>,
        path: &NodePath,
        leftovers: &mut Leftovers,
    ) {
        let children = branch.children();
        for (key, json) in object {
            let path = path.child(key.as_str());
            match children.get(key) {
                Some(ConfigNode::Leaf(leaf)) => apply_leaf(&leaf, json, &path, leftovers),
                Some(ConfigNode::Branch(child)) if self.includes(&child) => match json {
                    JsonValue::Object(inner) => self.apply_object(&child, inner, &path, leftovers),
                    _ => {
                        warn!(path = %path, found = json_kind(json), "branch needs an object");
                        leftovers.rejected.insert(path.to_string(), json.clone());
                    }
                },
                _ => {
                    leftovers.unknown.insert(path.to_string(), json.clone());
                }
            }
        }
    }
}

fn apply_leaf(leaf: &ConfigLeaf, json: &JsonValue, path: &NodePath, leftovers: &mut Leftovers) {
    if json.is_null() {
        leaf.reset();
        return;
    }
    let reason = match Decoder::decode(leaf.serialized_type(), json, path.to_string()) {
        Ok(value) if leaf.test(&value).is_usable() => {
            leaf.set_value(value);
            return;
        }
        Ok(_) => format!("outside {}", leaf.serialized_type()),
        Err(err) => err.to_string(),
    };
    warn!(path = %path, reason = %reason, "value not applied");
    leftovers.rejected.insert(path.to_string(), json.clone());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use settle_schema::{Decimal, DecimalType, SerializableType, Value};

    fn tree() -> (ConfigBranch, ConfigLeaf) {
        let root = ConfigBranch::root();
        let port = ConfigLeaf::new(
            "port",
            DecimalType::ranged(Decimal::ONE, Decimal::from(65535)).unwrap().into(),
            Some(Value::from(80)),
        )
        .unwrap();
        let debug = ConfigLeaf::new("debug", SerializableType::Boolean, None).unwrap();
        root.children().add(port.clone().into(), false).unwrap();
        root.children().add(debug.into(), false).unwrap();
        (root, port)
    }

    #[test]
    fn unset_leaves_without_default_are_omitted() {
        let (root, _) = tree();
        let json = JsonTreeSerializer::default().to_json(&root).unwrap();
        assert_eq!(json, json!({"port": 80}));
    }

    #[test]
    fn defaults_can_be_left_out() {
        let (root, port) = tree();
        let serializer = JsonTreeSerializer::new(SerializerOptions {
            include_defaults: false,
            ..SerializerOptions::default()
        });
        assert_eq!(serializer.to_json(&root).unwrap(), json!({}));

        port.set_value(Value::from(8080));
        assert_eq!(serializer.to_json(&root).unwrap(), json!({"port": 8080}));
    }

    #[test]
    fn out_of_range_values_are_rejected_not_applied() {
        let (root, port) = tree();
        let leftovers = JsonTreeSerializer::default()
            .apply_json(&root, &json!({"port": 0, "debug": true}))
            .unwrap();
        assert_eq!(port.value(), Some(Value::from(80)));
        assert_eq!(leftovers.rejected.get("port"), Some(&json!(0)));
        assert!(leftovers.unknown.is_empty());
    }

    #[test]
    fn scalar_for_a_branch_is_rejected_and_siblings_still_apply() {
        let (root, port) = tree();
        let nested = ConfigBranch::new("nested");
        root.children().add(nested.into(), false).unwrap();

        let leftovers = JsonTreeSerializer::default()
            .apply_json(&root, &json!({"nested": 3, "port": 8080}))
            .unwrap();
        assert_eq!(port.value(), Some(Value::from(8080)));
        assert_eq!(leftovers.rejected.get("nested"), Some(&json!(3)));
        assert!(leftovers.unknown.is_empty());
    }

    #[test]
    fn null_resets_a_leaf() {
        let (root, port) = tree();
        port.set_value(Value::from(443));
        let leftovers = JsonTreeSerializer::default()
            .apply_json(&root, &json!({"port": null}))
            .unwrap();
        assert!(leftovers.is_empty());
        assert!(!port.is_set());
        assert_eq!(port.value(), Some(Value::from(80)));
    }

    #[test]
    fn root_must_be_an_object() {
        let (root, _) = tree();
        let err = JsonTreeSerializer::default()
            .apply_json(&root, &json!([1]))
            .unwrap_err();
        assert!(matches!(err, SerializeError::RootNotObject(ref kind) if kind == "array"));
    }

    #[test]
    fn compact_rendering() {
        let (root, _) = tree();
        let serializer = JsonTreeSerializer::new(SerializerOptions {
            pretty: false,
            ..SerializerOptions::default()
        });
        assert_eq!(serializer.to_string(&root).unwrap(), r#"{"port":80}"#);
    }
}
