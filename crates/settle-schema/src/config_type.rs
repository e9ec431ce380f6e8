//! Runtime-facing config types
//!
//! A [`ConfigType<R>`] pairs a [`SerializableType`] with conversions between
//! the serialized [`Value`] and a runtime representation `R`.
//!
//! # Contract
//! - `to_serialized` converts, then requires the result to be accepted
//! - `to_runtime` requires acceptance, then converts
//! - `with_type` only narrows; widening fails at construction
//! - `derive` composes conversions in both directions
//!
//! Conversion failures are boundary errors ([`ConversionError`]), never
//! silent corrections.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::error::{ConversionError, SchemaError};
use crate::types::SerializableType;
use crate::value::Value;

type Serializer<R> = Arc<dyn Fn(&R) -> Result<Value, ConversionError> + Send + Sync>;
type Deserializer<R> = Arc<dyn Fn(&Value) -> Result<R, ConversionError> + Send + Sync>;

/// Serializable type with conversions to and from a runtime type `R`
pub struct ConfigType<R> {
    serialized: SerializableType,
    to_serialized: Serializer<R>,
    to_runtime: Deserializer<R>,
}

impl<R: 'static> ConfigType<R> {
    /// Create config type from its serialized type and conversions
    ///
    /// The conversions need not check constraints; the config type does.
    pub fn new<S, D>(serialized: SerializableType, to_serialized: S, to_runtime: D) -> Self
    where
        S: Fn(&R) -> Result<Value, ConversionError> + Send + Sync + 'static,
        D: Fn(&Value) -> Result<R, ConversionError> + Send + Sync + 'static,
    {
        Self {
            serialized,
            to_serialized: Arc::new(to_serialized),
            to_runtime: Arc::new(to_runtime),
        }
    }

    /// Underlying serialized type
    #[inline]
    #[must_use]
    pub fn serialized_type(&self) -> &SerializableType {
        &self.serialized
    }

    /// Convert a runtime value to its serialized form
    ///
    /// # Errors
    /// - the conversion's own error
    /// - `ConstraintViolation` if the serialized form is not accepted
    pub fn to_serialized(&self, value: &R) -> Result<Value, ConversionError> {
        let serialized = (self.to_serialized)(value)?;
        self.check(&serialized)?;
        Ok(serialized)
    }

    /// Convert a serialized value to its runtime form
    ///
    /// # Errors
    /// - `KindMismatch` or `ConstraintViolation` if the value is not accepted
    /// - the conversion's own error
    pub fn to_runtime(&self, value: &Value) -> Result<R, ConversionError> {
        self.check(value)?;
        (self.to_runtime)(value)
    }

    /// Runtime value converts to an accepted serialized value
    #[inline]
    #[must_use]
    pub fn accepts_runtime(&self, value: &R) -> bool {
        self.to_serialized(value).is_ok()
    }

    fn check(&self, value: &Value) -> Result<(), ConversionError> {
        let expected = self.serialized.value_kind();
        if value.kind() != expected {
            return Err(ConversionError::kind_mismatch(expected, value.kind()));
        }
        if !self.serialized.accepts(value) {
            return Err(ConversionError::ConstraintViolation {
                value: value.to_string(),
                ty: self.serialized.to_string(),
            });
        }
        Ok(())
    }

    /// Derive a config type with a different runtime representation
    ///
    /// `into_derived` runs after this type's deserializer, `from_derived`
    /// before its serializer, so deriving twice composes exactly.
    #[must_use]
    pub fn derive<U, F, G>(&self, into_derived: F, from_derived: G) -> ConfigType<U>
    where
        U: 'static,
        F: Fn(R) -> Result<U, ConversionError> + Send + Sync + 'static,
        G: Fn(&U) -> Result<R, ConversionError> + Send + Sync + 'static,
    {
        let base_serialize = Arc::clone(&self.to_serialized);
        let base_deserialize = Arc::clone(&self.to_runtime);
        ConfigType {
            serialized: self.serialized.clone(),
            to_serialized: Arc::new(move |value: &U| base_serialize(&from_derived(value)?)),
            to_runtime: Arc::new(move |value: &Value| into_derived(base_deserialize(value)?)),
        }
    }

    /// Same conversions over a narrower serialized type
    ///
    /// # Errors
    /// Returns `Widening` unless the current type comprehends `narrower`
    pub fn with_type(&self, narrower: SerializableType) -> Result<Self, SchemaError> {
        if !self.serialized.comprehends(&narrower) {
            return Err(SchemaError::Widening {
                current: self.serialized.to_string(),
                requested: narrower.to_string(),
            });
        }
        Ok(Self {
            serialized: narrower,
            to_serialized: Arc::clone(&self.to_serialized),
            to_runtime: Arc::clone(&self.to_runtime),
        })
    }
}

impl<R> Clone for ConfigType<R> {
    fn clone(&self) -> Self {
        Self {
            serialized: self.serialized.clone(),
            to_serialized: Arc::clone(&self.to_serialized),
            to_runtime: Arc::clone(&self.to_runtime),
        }
    }
}

impl<R> Debug for ConfigType<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigType")
            .field("serialized", &self.serialized)
            .field("runtime", &std::any::type_name::<R>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_types;
    use crate::types::DecimalType;
    use crate::value::ValueKind;
    use rust_decimal::Decimal;

    fn percent() -> ConfigType<i32> {
        let narrow = DecimalType::new(Some(Decimal::ZERO), Some(Decimal::ONE_HUNDRED), Some(Decimal::ONE))
            .unwrap();
        config_types::integer().with_type(narrow.into()).unwrap()
    }

    #[test]
    fn to_serialized_rejects_values_outside_type() {
        let ty = percent();
        assert_eq!(ty.to_serialized(&42).unwrap(), Value::from(42));
        assert!(matches!(
            ty.to_serialized(&101),
            Err(ConversionError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn to_runtime_rejects_before_converting() {
        let ty = percent();
        assert_eq!(ty.to_runtime(&Value::from(7)).unwrap(), 7);
        assert!(matches!(
            ty.to_runtime(&Value::from(-1)),
            Err(ConversionError::ConstraintViolation { .. })
        ));
        assert_eq!(
            ty.to_runtime(&Value::from("7")),
            Err(ConversionError::kind_mismatch(ValueKind::Decimal, ValueKind::String))
        );
    }

    #[test]
    fn misaligned_values_are_errors_not_corrections() {
        let ty = percent();
        assert!(ty.to_runtime(&Value::Decimal(Decimal::new(15, 1))).is_err());
    }

    #[test]
    fn with_type_refuses_to_widen() {
        let ty = percent();
        let wider = DecimalType::ranged(Decimal::ZERO, Decimal::from(1000)).unwrap();
        assert!(matches!(
            ty.with_type(wider.into()),
            Err(SchemaError::Widening { .. })
        ));
    }

    #[test]
    fn derive_composes_both_directions() {
        let base = percent();
        let doubled = base.derive(|v| Ok(i64::from(v) * 2), |v: &i64| {
            i32::try_from(v / 2).map_err(|e| ConversionError::Custom(e.to_string()))
        });
        let text = doubled.derive(|v| Ok(v.to_string()), |s: &String| {
            s.parse::<i64>().map_err(|e| ConversionError::Custom(e.to_string()))
        });

        assert_eq!(text.to_runtime(&Value::from(21)).unwrap(), "42");
        assert_eq!(text.to_serialized(&"42".to_string()).unwrap(), Value::from(21));

        let direct = base.derive(
            |v| Ok((i64::from(v) * 2).to_string()),
            |s: &String| {
                let n: i64 = s.parse().map_err(|e: std::num::ParseIntError| ConversionError::Custom(e.to_string()))?;
                i32::try_from(n / 2).map_err(|e| ConversionError::Custom(e.to_string()))
            },
        );
        for n in [0, 13, 100] {
            let value = Value::from(n);
            assert_eq!(text.to_runtime(&value).unwrap(), direct.to_runtime(&value).unwrap());
        }
    }

    #[test]
    fn derived_type_keeps_constraints() {
        let text = percent().derive(|v| Ok(v.to_string()), |s: &String| {
            s.parse::<i32>().map_err(|e| ConversionError::Custom(e.to_string()))
        });
        assert!(text.to_serialized(&"500".to_string()).is_err());
        assert!(!text.accepts_runtime(&"500".to_string()));
    }
}
