//! String constraints
//!
//! Length and pattern violations are unrecoverable: there is no safe
//! automatic repair for arbitrary text.

use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use regex::Regex;

use crate::check::TypeCheckResult;
use crate::error::SchemaError;

/// Length-bounded, optionally patterned string type
///
/// Lengths count Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StringType {
    min_len: usize,
    max_len: usize,
    pattern: Option<Pattern>,
}

impl StringType {
    /// Create string type
    ///
    /// # Errors
    /// - `InvalidBounds` if `min_len > max_len`
    /// - `InvalidPattern` if the pattern does not compile
    pub fn new(min_len: usize, max_len: usize, pattern: Option<&str>) -> Result<Self, SchemaError> {
        if min_len > max_len {
            return Err(SchemaError::InvalidBounds {
                min: min_len.to_string(),
                max: max_len.to_string(),
            });
        }
        let pattern = pattern.map(Pattern::new).transpose()?;
        Ok(Self {
            min_len,
            max_len,
            pattern,
        })
    }

    /// Any string
    #[inline]
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            min_len: 0,
            max_len: usize::MAX,
            pattern: None,
        }
    }

    /// Strings of exactly `len` characters
    pub(crate) fn exact(len: usize) -> Self {
        Self {
            min_len: len,
            max_len: len,
            pattern: None,
        }
    }

    /// Replace the minimum length
    ///
    /// # Errors
    /// Returns `InvalidBounds` if it exceeds the maximum length
    pub fn with_min_len(&self, min_len: usize) -> Result<Self, SchemaError> {
        Self::checked(min_len, self.max_len, self.pattern.clone())
    }

    /// Replace the maximum length
    ///
    /// # Errors
    /// Returns `InvalidBounds` if it is below the minimum length
    pub fn with_max_len(&self, max_len: usize) -> Result<Self, SchemaError> {
        Self::checked(self.min_len, max_len, self.pattern.clone())
    }

    /// Replace the pattern
    ///
    /// The pattern must match the whole string.
    ///
    /// # Errors
    /// Returns `InvalidPattern` if the pattern does not compile
    pub fn with_pattern(&self, pattern: &str) -> Result<Self, SchemaError> {
        Self::checked(self.min_len, self.max_len, Some(Pattern::new(pattern)?))
    }

    fn checked(min_len: usize, max_len: usize, pattern: Option<Pattern>) -> Result<Self, SchemaError> {
        if min_len > max_len {
            return Err(SchemaError::InvalidBounds {
                min: min_len.to_string(),
                max: max_len.to_string(),
            });
        }
        Ok(Self {
            min_len,
            max_len,
            pattern,
        })
    }

    /// Minimum length
    #[inline]
    #[must_use]
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Maximum length
    #[inline]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Pattern source text
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }

    /// Test a string against length and pattern
    pub fn test(&self, value: &str) -> TypeCheckResult<String> {
        let len = value.chars().count();
        if len < self.min_len || len > self.max_len {
            return TypeCheckResult::Unrecoverable;
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.matches(value) {
                return TypeCheckResult::Unrecoverable;
            }
        }
        TypeCheckResult::Accepted
    }

    /// Check that every string `other` accepts is accepted here
    ///
    /// Patterns are compared textually: a patterned type only comprehends
    /// types with the identical pattern.
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        self.min_len <= other.min_len
            && self.max_len >= other.max_len
            && self.pattern.as_ref().map_or(true, |p| other.pattern.as_ref() == Some(p))
    }
}

impl Default for StringType {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl Display for StringType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "string")?;
        if self.min_len > 0 || self.max_len < usize::MAX {
            write!(f, "[{}, ", self.min_len)?;
            if self.max_len == usize::MAX {
                write!(f, "+inf]")?;
            } else {
                write!(f, "{}]", self.max_len)?;
            }
        }
        if let Some(pattern) = &self.pattern {
            write!(f, " /{}/", pattern.as_str())?;
        }
        Ok(())
    }
}

/// Compiled whole-string pattern, compared by source text
#[derive(Debug, Clone)]
struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    fn new(source: &str) -> Result<Self, SchemaError> {
        let anchored = Regex::new(&format!("^(?:{source})$")).map_err(|e| SchemaError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            anchored,
        })
    }

    fn as_str(&self) -> &str {
        &self.source
    }

    fn matches(&self, value: &str) -> bool {
        self.anchored.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}
