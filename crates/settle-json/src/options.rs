//! Serializer options

use serde::{Deserialize, Serialize};

/// Controls what [`JsonTreeSerializer`](crate::JsonTreeSerializer) writes
///
/// Missing fields take their defaults, so an options file may list only
/// what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Write leaves still holding their default value
    pub include_defaults: bool,
    /// Recurse into branches flagged for separate serialization
    pub include_separate: bool,
    /// Indent rendered documents
    pub pretty: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            include_defaults: true,
            include_separate: false,
            pretty: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fill_defaults() {
        let options: SerializerOptions = serde_json::from_str(r#"{"pretty": false}"#).unwrap();
        assert_eq!(
            options,
            SerializerOptions {
                pretty: false,
                ..SerializerOptions::default()
            }
        );
    }

    #[test]
    fn empty_object_is_default() {
        let options: SerializerOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, SerializerOptions::default());
    }
}
