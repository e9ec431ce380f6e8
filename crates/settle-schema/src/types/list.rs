//! List constraints
//!
//! Correction walks the input in order and builds a substitute:
//! 1. stop once `max_size` elements are kept
//! 2. keep accepted elements, substitute corrected ones, skip unrecoverable ones
//! 3. skip repeats when `unique` is set
//!
//! A substitute shorter than `min_size` makes the whole list unrecoverable.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::check::TypeCheckResult;
use crate::error::SchemaError;
use crate::types::SerializableType;
use crate::value::Value;

/// Homogeneous list type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListType {
    element: Arc<SerializableType>,
    min_size: usize,
    max_size: usize,
    unique: bool,
}

impl ListType {
    /// Unbounded, non-unique list of `element`
    #[inline]
    #[must_use]
    pub fn of(element: SerializableType) -> Self {
        Self {
            element: Arc::new(element),
            min_size: 0,
            max_size: usize::MAX,
            unique: false,
        }
    }

    /// Create list type
    ///
    /// # Errors
    /// Returns `InvalidBounds` if `min_size > max_size`
    pub fn new(
        element: SerializableType,
        min_size: usize,
        max_size: usize,
        unique: bool,
    ) -> Result<Self, SchemaError> {
        Self::of(element).sized(min_size, max_size, unique)
    }

    fn sized(mut self, min_size: usize, max_size: usize, unique: bool) -> Result<Self, SchemaError> {
        if min_size > max_size {
            return Err(SchemaError::InvalidBounds {
                min: min_size.to_string(),
                max: max_size.to_string(),
            });
        }
        self.min_size = min_size;
        self.max_size = max_size;
        self.unique = unique;
        Ok(self)
    }

    /// Replace the minimum size
    ///
    /// # Errors
    /// Returns `InvalidBounds` if it exceeds the maximum size
    pub fn with_min_size(&self, min_size: usize) -> Result<Self, SchemaError> {
        self.clone().sized(min_size, self.max_size, self.unique)
    }

    /// Replace the maximum size
    ///
    /// # Errors
    /// Returns `InvalidBounds` if it is below the minimum size
    pub fn with_max_size(&self, max_size: usize) -> Result<Self, SchemaError> {
        self.clone().sized(self.min_size, max_size, self.unique)
    }

    /// Require distinct elements
    #[must_use]
    pub fn unique(&self) -> Self {
        Self {
            unique: true,
            ..self.clone()
        }
    }

    /// Element type
    #[inline]
    #[must_use]
    pub fn element(&self) -> &SerializableType {
        &self.element
    }

    /// Minimum size
    #[inline]
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Maximum size
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Elements must be distinct
    #[inline]
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Test a list, producing a corrected list where possible
    pub fn test(&self, items: &[Value]) -> TypeCheckResult<Vec<Value>> {
        let mut corrected = false;
        let mut kept: Vec<Value> = Vec::with_capacity(items.len().min(self.max_size));

        for item in items {
            if kept.len() >= self.max_size {
                corrected = true;
                break;
            }
            let candidate = match self.element.test(item) {
                TypeCheckResult::Accepted => item.clone(),
                TypeCheckResult::Corrected(value) => {
                    corrected = true;
                    value
                }
                TypeCheckResult::Unrecoverable => {
                    corrected = true;
                    continue;
                }
            };
            if self.unique && kept.contains(&candidate) {
                corrected = true;
                continue;
            }
            kept.push(candidate);
        }

        if kept.len() < self.min_size {
            TypeCheckResult::Unrecoverable
        } else if corrected {
            TypeCheckResult::Corrected(kept)
        } else {
            TypeCheckResult::Accepted
        }
    }

    /// Check that every list `other` accepts is accepted here
    ///
    /// Non-unique is the wider constraint.
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        self.min_size <= other.min_size
            && self.max_size >= other.max_size
            && self.element.comprehends(&other.element)
            && (!self.unique || other.unique)
    }
}

impl Display for ListType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "list<{}>", self.element)?;
        write_size_bounds(f, self.min_size, self.max_size)?;
        if self.unique {
            write!(f, " unique")?;
        }
        Ok(())
    }
}

pub(crate) fn write_size_bounds(f: &mut Formatter<'_>, min: usize, max: usize) -> fmt::Result {
    if min == 0 && max == usize::MAX {
        return Ok(());
    }
    if max == usize::MAX {
        write!(f, "[{min}, +inf]")
    } else {
        write!(f, "[{min}, {max}]")
    }
}
