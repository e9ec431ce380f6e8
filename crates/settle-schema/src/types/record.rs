//! Structural record constraints
//!
//! Records are open: undeclared fields are carried through untouched.
//! Comprehension is per-field equality, not per-field narrowing.

use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::check::TypeCheckResult;
use crate::error::SchemaError;
use crate::types::SerializableType;
use crate::value::Value;

/// Record type: ordered field name → field type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordType {
    fields: IndexMap<String, SerializableType>,
}

impl RecordType {
    /// Create record type from declared fields
    ///
    /// # Errors
    /// Returns `DuplicateField` if a name is declared twice
    pub fn new<I, S>(fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, SerializableType)>,
        S: Into<String>,
    {
        fields
            .into_iter()
            .try_fold(Self::default(), |record, (name, ty)| record.with_field(name, ty))
    }

    /// Add a field
    ///
    /// # Errors
    /// Returns `DuplicateField` if the name is already declared
    pub fn with_field(mut self, name: impl Into<String>, ty: SerializableType) -> Result<Self, SchemaError> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(SchemaError::DuplicateField(name));
        }
        self.fields.insert(name, ty);
        Ok(self)
    }

    /// Declared fields in declaration order
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (&str, &SerializableType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// Type of a declared field
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SerializableType> {
        self.fields.get(name)
    }

    /// Number of declared fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// No declared fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Test a record value field by field
    ///
    /// A missing or unrecoverable declared field rejects the record; field
    /// corrections produce a corrected record.
    pub fn test(&self, value: &IndexMap<String, Value>) -> TypeCheckResult<IndexMap<String, Value>> {
        let mut corrections = Vec::new();
        for (name, ty) in &self.fields {
            let Some(field_value) = value.get(name) else {
                return TypeCheckResult::Unrecoverable;
            };
            match ty.test(field_value) {
                TypeCheckResult::Accepted => {}
                TypeCheckResult::Corrected(fixed) => corrections.push((name, fixed)),
                TypeCheckResult::Unrecoverable => return TypeCheckResult::Unrecoverable,
            }
        }

        if corrections.is_empty() {
            return TypeCheckResult::Accepted;
        }
        let mut fixed = value.clone();
        for (name, replacement) in corrections {
            if let Some(slot) = fixed.get_mut(name) {
                *slot = replacement;
            }
        }
        TypeCheckResult::Corrected(fixed)
    }

    /// Every field declared here exists in `other` with an equal type
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        self.fields
            .iter()
            .all(|(name, ty)| other.fields.get(name) == Some(ty))
    }
}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // equality ignores declaration order, so hashing must too
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        fields.len().hash(state);
        for (name, ty) in fields {
            name.hash(state);
            ty.hash(state);
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "record{{")?;
        for (i, (name, ty)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {ty}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DecimalType, EnumType, StringType};
    use rust_decimal::Decimal;

    fn point() -> RecordType {
        RecordType::new([
            ("x", SerializableType::Decimal(DecimalType::ranged(Decimal::ZERO, Decimal::TEN).unwrap())),
            ("mode", SerializableType::Enum(EnumType::new(["A", "B"]).unwrap())),
        ])
        .unwrap()
    }

    fn fields(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
    }

    #[test]
    fn accepts_complete_record_with_extras() {
        let value = fields(&[("x", 3.into()), ("mode", "A".into()), ("extra", true.into())]);
        assert!(point().test(&value).is_accepted());
    }

    #[test]
    fn missing_field_is_unrecoverable() {
        let value = fields(&[("x", 3.into())]);
        assert!(point().test(&value).is_unrecoverable());
    }

    #[test]
    fn field_corrections_are_applied() {
        let value = fields(&[("x", 3.into()), ("mode", "b".into()), ("extra", true.into())]);
        let expected = fields(&[("x", 3.into()), ("mode", "B".into()), ("extra", true.into())]);
        assert_eq!(point().test(&value), TypeCheckResult::Corrected(expected));
    }

    #[test]
    fn duplicate_field_is_rejected() {
        let result = RecordType::new([
            ("a", SerializableType::Boolean),
            ("a", SerializableType::Boolean),
        ]);
        assert_eq!(result, Err(SchemaError::DuplicateField("a".to_string())));
    }

    #[test]
    fn comprehension_is_per_field_equality() {
        let narrow_name = SerializableType::String(StringType::new(1, 5, None).unwrap());
        let any_name = SerializableType::String(StringType::unbounded());

        let declared = RecordType::new([("name", any_name)]).unwrap();
        let candidate = RecordType::new([("name", narrow_name.clone())]).unwrap();

        // a wider field type does NOT comprehend a narrower one for records
        assert!(!declared.comprehends(&candidate));

        let wider_record = RecordType::new([
            ("name", narrow_name),
            ("age", SerializableType::Boolean),
        ])
        .unwrap();
        assert!(candidate.comprehends(&wider_record));
        assert!(!wider_record.comprehends(&candidate));
    }

    #[test]
    fn equality_ignores_declaration_order() {
        let a = RecordType::new([("a", SerializableType::Boolean), ("b", SerializableType::Boolean)]).unwrap();
        let b = RecordType::new([("b", SerializableType::Boolean), ("a", SerializableType::Boolean)]).unwrap();
        assert_eq!(a, b);
    }
}
