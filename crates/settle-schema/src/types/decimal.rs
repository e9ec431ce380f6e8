//! Decimal constraints
//!
//! Range bounds are hard limits: a value outside `[min, max]` is
//! unrecoverable. Only increment misalignment is corrected, by snapping to
//! the nearer tick `min + k * increment`. On a tie the upper tick wins,
//! unless it lies above `max`.

use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

use crate::check::TypeCheckResult;
use crate::error::SchemaError;

/// Bounded, optionally stepped decimal type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DecimalType {
    min: Option<Decimal>,
    max: Option<Decimal>,
    increment: Option<Decimal>,
}

impl DecimalType {
    /// Create decimal type
    ///
    /// # Errors
    /// - `InvalidBounds` if `min > max`
    /// - `NonPositiveIncrement` if `increment <= 0`
    /// - `IncrementWithoutMinimum` if an increment has no minimum
    pub fn new(
        min: Option<Decimal>,
        max: Option<Decimal>,
        increment: Option<Decimal>,
    ) -> Result<Self, SchemaError> {
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(SchemaError::InvalidBounds {
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }
        if let Some(step) = increment {
            if step <= Decimal::ZERO {
                return Err(SchemaError::NonPositiveIncrement(step.to_string()));
            }
            if min.is_none() {
                return Err(SchemaError::IncrementWithoutMinimum(step.to_string()));
            }
        }
        Ok(Self {
            min,
            max,
            increment,
        })
    }

    /// Whole numbers within `[min, max]`
    ///
    /// Callers guarantee `min <= max`.
    pub(crate) fn integral(min: Decimal, max: Decimal) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            increment: Some(Decimal::ONE),
        }
    }

    /// Any decimal
    #[inline]
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Decimal within `[min, max]`
    ///
    /// # Errors
    /// Returns `InvalidBounds` if `min > max`
    #[inline]
    pub fn ranged(min: Decimal, max: Decimal) -> Result<Self, SchemaError> {
        Self::new(Some(min), Some(max), None)
    }

    /// Replace the minimum
    ///
    /// # Errors
    /// Same as [`DecimalType::new`]
    #[inline]
    pub fn with_min(&self, min: Decimal) -> Result<Self, SchemaError> {
        Self::new(Some(min), self.max, self.increment)
    }

    /// Replace the maximum
    ///
    /// # Errors
    /// Same as [`DecimalType::new`]
    #[inline]
    pub fn with_max(&self, max: Decimal) -> Result<Self, SchemaError> {
        Self::new(self.min, Some(max), self.increment)
    }

    /// Replace the increment
    ///
    /// # Errors
    /// Same as [`DecimalType::new`]
    #[inline]
    pub fn with_increment(&self, increment: Decimal) -> Result<Self, SchemaError> {
        Self::new(self.min, self.max, Some(increment))
    }

    /// Lower bound
    #[inline]
    #[must_use]
    pub fn min(&self) -> Option<Decimal> {
        self.min
    }

    /// Upper bound
    #[inline]
    #[must_use]
    pub fn max(&self) -> Option<Decimal> {
        self.max
    }

    /// Tick size, anchored at the minimum
    #[inline]
    #[must_use]
    pub fn increment(&self) -> Option<Decimal> {
        self.increment
    }

    /// Test a decimal against the bounds and increment
    pub fn test(&self, value: Decimal) -> TypeCheckResult<Decimal> {
        if self.min.is_some_and(|min| value < min) || self.max.is_some_and(|max| value > max) {
            return TypeCheckResult::Unrecoverable;
        }

        let (Some(step), Some(min)) = (self.increment, self.min) else {
            return TypeCheckResult::Accepted;
        };

        // offset is non-negative here, so the remainder is too
        let Some(rem) = value.checked_sub(min).and_then(|offset| offset.checked_rem(step)) else {
            return TypeCheckResult::Unrecoverable;
        };
        if rem.is_zero() {
            return TypeCheckResult::Accepted;
        }

        let lower = value - rem;
        let snapped = match lower.checked_add(step) {
            Some(upper) if self.max.map_or(true, |max| upper <= max) && upper - value <= rem => {
                upper
            }
            _ => lower,
        };
        TypeCheckResult::Corrected(snapped)
    }

    /// Check that every value this type's `other` accepts is accepted here
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        let lower_ok = match (self.min, other.min) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a <= b,
        };
        let upper_ok = match (self.max, other.max) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => a >= b,
        };
        let step_ok = match (self.increment, other.increment) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => {
                let divides = b.checked_rem(a).is_some_and(|r| r.is_zero());
                // the other's ticks must land on ours, not just share a spacing
                let aligned = match (self.min, other.min) {
                    (Some(am), Some(bm)) => bm
                        .checked_sub(am)
                        .and_then(|d| d.checked_rem(a))
                        .is_some_and(|r| r.is_zero()),
                    _ => false,
                };
                divides && aligned
            }
        };
        lower_ok && upper_ok && step_ok
    }
}

impl Display for DecimalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "decimal")?;
        if self.min.is_some() || self.max.is_some() {
            match self.min {
                Some(min) => write!(f, "[{min}, ")?,
                None => write!(f, "[-inf, ")?,
            }
            match self.max {
                Some(max) => write!(f, "{max}]")?,
                None => write!(f, "+inf]")?,
            }
        }
        if let Some(step) = self.increment {
            write!(f, " step {step}")?;
        }
        Ok(())
    }
}
