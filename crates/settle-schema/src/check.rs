//! Constraint check outcomes

use crate::value::Value;

/// Outcome of testing one value against a type's constraints
///
/// - `Accepted`: the value satisfies every constraint unchanged
/// - `Corrected`: the value failed, but the carried substitute is valid
/// - `Unrecoverable`: no valid substitute exists; the write must be rejected
///
/// Callers must never treat `Unrecoverable` as success.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum TypeCheckResult<V = Value> {
    /// Value is valid as given
    Accepted,

    /// Value is invalid; the substitute is valid
    Corrected(V),

    /// Value is invalid and cannot be repaired
    Unrecoverable,
}

impl<V> TypeCheckResult<V> {
    /// Value passed without correction
    #[inline]
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Value was replaced by a substitute
    #[inline]
    #[must_use]
    pub fn is_corrected(&self) -> bool {
        matches!(self, Self::Corrected(_))
    }

    /// Value was rejected outright
    #[inline]
    #[must_use]
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::Unrecoverable)
    }

    /// A usable value exists (accepted or corrected)
    #[inline]
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.is_unrecoverable()
    }

    /// Get the substitute value, if corrected
    #[inline]
    #[must_use]
    pub fn corrected_value(&self) -> Option<&V> {
        match self {
            Self::Corrected(v) => Some(v),
            _ => None,
        }
    }

    /// Resolve to the value that should be stored
    ///
    /// Returns `original` when accepted, the substitute when corrected,
    /// and `None` when unrecoverable.
    #[inline]
    pub fn resolve(self, original: V) -> Option<V> {
        match self {
            Self::Accepted => Some(original),
            Self::Corrected(v) => Some(v),
            Self::Unrecoverable => None,
        }
    }

    /// Map the substitute value
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> TypeCheckResult<U> {
        match self {
            Self::Accepted => TypeCheckResult::Accepted,
            Self::Corrected(v) => TypeCheckResult::Corrected(f(v)),
            Self::Unrecoverable => TypeCheckResult::Unrecoverable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_picks_stored_value() {
        let accepted: TypeCheckResult<i32> = TypeCheckResult::Accepted;
        assert_eq!(accepted.resolve(1), Some(1));
        assert_eq!(TypeCheckResult::Corrected(2).resolve(1), Some(2));
        assert_eq!(TypeCheckResult::<i32>::Unrecoverable.resolve(1), None);
    }

    #[test]
    fn unrecoverable_is_not_usable() {
        let result: TypeCheckResult<i32> = TypeCheckResult::Unrecoverable;
        assert!(!result.is_usable());
        assert!(!result.is_accepted());
        assert!(result.corrected_value().is_none());
    }

    #[test]
    fn map_keeps_outcome() {
        let mapped = TypeCheckResult::Corrected(2).map(|v| v * 10);
        assert_eq!(mapped.corrected_value(), Some(&20));
        assert!(TypeCheckResult::<i32>::Accepted.map(|v| v + 1).is_accepted());
    }
}
