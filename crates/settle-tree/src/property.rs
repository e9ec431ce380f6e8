//! Leaf-shaped access
//!
//! [`Property`] is the read/write surface shared by a [`ConfigLeaf`] and a
//! [`PropertyMirror`], so callers can work against either.

use std::convert::Infallible;

use settle_schema::Value;

use crate::error::MirrorError;
use crate::leaf::ConfigLeaf;
use crate::mirror::PropertyMirror;

/// A readable, writable configuration value
pub trait Property {
    /// Value type seen by callers
    type Value;

    /// Why an operation could not reach a value
    type Error;

    /// Current value, or the default when unset
    ///
    /// # Errors
    /// Implementation specific, see [`Property::Error`]
    fn value(&self) -> Result<Option<Self::Value>, Self::Error>;

    /// Write a value; `true` when the stored value changed
    ///
    /// # Errors
    /// Implementation specific, see [`Property::Error`]
    fn set_value(&self, value: &Self::Value) -> Result<bool, Self::Error>;

    /// Value would be stored unchanged
    ///
    /// # Errors
    /// Implementation specific, see [`Property::Error`]
    fn accepts(&self, value: &Self::Value) -> Result<bool, Self::Error>;
}

impl Property for ConfigLeaf {
    type Value = Value;
    type Error = Infallible;

    fn value(&self) -> Result<Option<Value>, Infallible> {
        Ok(ConfigLeaf::value(self))
    }

    fn set_value(&self, value: &Value) -> Result<bool, Infallible> {
        Ok(ConfigLeaf::set_value(self, value.clone()))
    }

    fn accepts(&self, value: &Value) -> Result<bool, Infallible> {
        Ok(ConfigLeaf::accepts(self, value))
    }
}

impl<R: Clone + 'static> Property for PropertyMirror<R> {
    type Value = R;
    type Error = MirrorError;

    fn value(&self) -> Result<Option<R>, MirrorError> {
        PropertyMirror::value(self)
    }

    fn set_value(&self, value: &R) -> Result<bool, MirrorError> {
        PropertyMirror::set_value(self, value)
    }

    fn accepts(&self, value: &R) -> Result<bool, MirrorError> {
        PropertyMirror::accepts(self, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_schema::{config_types, Decimal, DecimalType};

    fn percent_leaf() -> ConfigLeaf {
        let ty = DecimalType::new(Some(Decimal::ZERO), Some(Decimal::ONE_HUNDRED), Some(Decimal::ONE))
            .unwrap();
        ConfigLeaf::new("percent", ty.into(), Some(Value::from(5))).unwrap()
    }

    // Store `value` only if the property takes it as is
    fn set_if_accepted<P: Property>(property: &P, value: &P::Value) -> Result<bool, P::Error> {
        if property.accepts(value)? {
            property.set_value(value)
        } else {
            Ok(false)
        }
    }

    #[test]
    fn leaf_and_mirror_share_one_surface() {
        let leaf = percent_leaf();
        let mirror = PropertyMirror::new(config_types::integer());
        mirror.mirror(&leaf).unwrap();

        assert_eq!(set_if_accepted(&leaf, &Value::from(30)), Ok(true));
        assert_eq!(Property::value(&mirror), Ok(Some(30)));

        assert_eq!(set_if_accepted(&mirror, &250), Ok(false));
        assert_eq!(set_if_accepted(&mirror, &60), Ok(true));
        assert_eq!(Property::value(&leaf), Ok(Some(Value::from(60))));
    }

    #[test]
    fn unbound_mirror_reports_through_the_trait() {
        let mirror = PropertyMirror::new(config_types::integer());
        assert_eq!(set_if_accepted(&mirror, &1), Err(MirrorError::Unbound));
    }
}
