//! String-keyed map constraints
//!
//! Same size and correction policy as lists, applied to entries in
//! insertion order. Keys are always strings and always pass.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::check::TypeCheckResult;
use crate::error::SchemaError;
use crate::types::list::write_size_bounds;
use crate::types::SerializableType;
use crate::value::Value;

/// Map from string keys to values of one type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapType {
    value: Arc<SerializableType>,
    min_size: usize,
    max_size: usize,
}

impl MapType {
    /// Unbounded map of `value`
    #[inline]
    #[must_use]
    pub fn of(value: SerializableType) -> Self {
        Self {
            value: Arc::new(value),
            min_size: 0,
            max_size: usize::MAX,
        }
    }

    /// Create map type
    ///
    /// # Errors
    /// Returns `InvalidBounds` if `min_size > max_size`
    pub fn new(value: SerializableType, min_size: usize, max_size: usize) -> Result<Self, SchemaError> {
        Self::of(value).sized(min_size, max_size)
    }

    fn sized(mut self, min_size: usize, max_size: usize) -> Result<Self, SchemaError> {
        if min_size > max_size {
            return Err(SchemaError::InvalidBounds {
                min: min_size.to_string(),
                max: max_size.to_string(),
            });
        }
        self.min_size = min_size;
        self.max_size = max_size;
        Ok(self)
    }

    /// Replace the minimum size
    ///
    /// # Errors
    /// Returns `InvalidBounds` if it exceeds the maximum size
    pub fn with_min_size(&self, min_size: usize) -> Result<Self, SchemaError> {
        self.clone().sized(min_size, self.max_size)
    }

    /// Replace the maximum size
    ///
    /// # Errors
    /// Returns `InvalidBounds` if it is below the minimum size
    pub fn with_max_size(&self, max_size: usize) -> Result<Self, SchemaError> {
        self.clone().sized(self.min_size, max_size)
    }

    /// Value type
    #[inline]
    #[must_use]
    pub fn value(&self) -> &SerializableType {
        &self.value
    }

    /// Minimum entry count
    #[inline]
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Maximum entry count
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Test a map, producing a corrected map where possible
    pub fn test(&self, entries: &IndexMap<String, Value>) -> TypeCheckResult<IndexMap<String, Value>> {
        let mut corrected = false;
        let mut kept = IndexMap::with_capacity(entries.len().min(self.max_size));

        for (key, item) in entries {
            if kept.len() >= self.max_size {
                corrected = true;
                break;
            }
            match self.value.test(item) {
                TypeCheckResult::Accepted => {
                    kept.insert(key.clone(), item.clone());
                }
                TypeCheckResult::Corrected(value) => {
                    corrected = true;
                    kept.insert(key.clone(), value);
                }
                TypeCheckResult::Unrecoverable => corrected = true,
            }
        }

        if kept.len() < self.min_size {
            TypeCheckResult::Unrecoverable
        } else if corrected {
            TypeCheckResult::Corrected(kept)
        } else {
            TypeCheckResult::Accepted
        }
    }

    /// Check that every map `other` accepts is accepted here
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        self.min_size <= other.min_size
            && self.max_size >= other.max_size
            && self.value.comprehends(&other.value)
    }
}

impl Display for MapType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "map<string, {}>", self.value)?;
        write_size_bounds(f, self.min_size, self.max_size)
    }
}
