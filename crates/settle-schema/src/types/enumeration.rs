//! Enumerated string tokens

use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use crate::check::TypeCheckResult;
use crate::error::SchemaError;

/// Closed set of valid string tokens
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    values: BTreeSet<String>,
}

impl EnumType {
    /// Create enum type from its valid tokens
    ///
    /// # Errors
    /// Returns `EmptyEnum` if no tokens are given
    pub fn new<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        Ok(Self { values })
    }

    /// Valid tokens, sorted
    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Check token membership
    #[inline]
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.values.contains(token)
    }

    /// Test a token; an upper-cased match is offered as a correction
    pub fn test(&self, token: &str) -> TypeCheckResult<String> {
        if self.values.contains(token) {
            return TypeCheckResult::Accepted;
        }
        let upper = token.to_uppercase();
        if self.values.contains(&upper) {
            TypeCheckResult::Corrected(upper)
        } else {
            TypeCheckResult::Unrecoverable
        }
    }

    /// Check that every token of `other` is valid here
    #[inline]
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        self.values.is_superset(&other.values)
    }
}

impl Display for EnumType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.values().collect();
        write!(f, "enum{{{}}}", tokens.join(", "))
    }
}
