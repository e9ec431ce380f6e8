//! Error types for the JSON adapter

/// JSON adapter failure
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON shape does not fit the declared type or tree
    #[error("at '{path}': expected {expected}, found {found}")]
    ShapeMismatch {
        /// Dotted path of the offending entry
        path: String,
        /// Expected JSON shape
        expected: &'static str,
        /// Rendered offending value
        found: String,
    },

    /// Document root must be a JSON object
    #[error("document root must be an object, found {0}")]
    RootNotObject(String),

    /// Parse or render failure
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SerializeError {
    pub(crate) fn shape(path: impl ToString, expected: &'static str, found: impl ToString) -> Self {
        Self::ShapeMismatch {
            path: path.to_string(),
            expected,
            found: found.to_string(),
        }
    }
}

/// Result alias for the JSON adapter
pub type SerializeResult<T> = Result<T, SerializeError>;
