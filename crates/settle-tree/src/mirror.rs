//! Property mirrors
//!
//! A [`PropertyMirror`] is a typed, leaf-shaped proxy over whichever
//! [`ConfigLeaf`] it is currently bound to. Reads convert the delegate's
//! value through a [`ConfigType`] and cache the result until the delegate
//! reports a change.

use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use settle_schema::{ConfigType, SerializableType, Value};

use crate::error::MirrorError;
use crate::leaf::{ConfigLeaf, ListenerId};

struct Binding {
    delegate: ConfigLeaf,
    listener: ListenerId,
    stale: Arc<AtomicBool>,
}

/// Typed proxy forwarding to a bound delegate leaf
pub struct PropertyMirror<R> {
    ty: ConfigType<R>,
    binding: Mutex<Option<Binding>>,
    cache: Mutex<Option<Option<R>>>,
}

impl<R: Clone + 'static> PropertyMirror<R> {
    /// Create an unbound mirror
    #[must_use]
    pub fn new(ty: ConfigType<R>) -> Self {
        Self {
            ty,
            binding: Mutex::new(None),
            cache: Mutex::new(None),
        }
    }

    /// Config type used for conversions
    #[inline]
    #[must_use]
    pub fn config_type(&self) -> &ConfigType<R> {
        &self.ty
    }

    /// Bind to `delegate`, releasing any previous delegate
    ///
    /// # Errors
    /// Returns `IncompatibleDelegate` unless the mirror's serialized type
    /// comprehends the delegate's
    pub fn mirror(&self, delegate: &ConfigLeaf) -> Result<(), MirrorError> {
        let ours = self.ty.serialized_type();
        if !ours.comprehends(delegate.serialized_type()) {
            return Err(MirrorError::IncompatibleDelegate {
                mirror: ours.to_string(),
                delegate: delegate.serialized_type().to_string(),
            });
        }

        let stale = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&stale);
        let listener = delegate.add_change_listener(move |_, _| flag.store(true, Ordering::Release));

        let previous = self.binding.lock().replace(Binding {
            delegate: delegate.clone(),
            listener,
            stale,
        });
        if let Some(previous) = previous {
            previous.delegate.remove_change_listener(previous.listener);
        }
        *self.cache.lock() = None;
        Ok(())
    }

    /// Release the delegate; later calls fail with `Unbound`
    pub fn unbind(&self) {
        if let Some(previous) = self.binding.lock().take() {
            previous.delegate.remove_change_listener(previous.listener);
        }
        *self.cache.lock() = None;
    }

    /// Currently bound delegate
    #[must_use]
    pub fn delegate(&self) -> Option<ConfigLeaf> {
        self.binding.lock().as_ref().map(|b| b.delegate.clone())
    }

    /// Delegate's value converted to the runtime type
    ///
    /// # Errors
    /// - `Unbound` before [`PropertyMirror::mirror`]
    /// - `Conversion` if the stored value does not convert
    pub fn value(&self) -> Result<Option<R>, MirrorError> {
        let (delegate, stale) = self.bound()?;
        let mut cache = self.cache.lock();
        if stale.swap(false, Ordering::AcqRel) || cache.is_none() {
            let converted = match delegate.value() {
                Some(value) => Some(self.ty.to_runtime(&value)?),
                None => None,
            };
            *cache = Some(converted);
        }
        Ok(cache.clone().flatten())
    }

    /// Convert and write a runtime value to the delegate
    ///
    /// Returns the delegate's changed/unchanged signal.
    ///
    /// # Errors
    /// - `Unbound` before [`PropertyMirror::mirror`]
    /// - `Conversion` if the value is outside the mirror's type
    pub fn set_value(&self, value: &R) -> Result<bool, MirrorError> {
        let (delegate, _) = self.bound()?;
        let serialized = self.ty.to_serialized(value)?;
        Ok(delegate.set_value(serialized))
    }

    /// Runtime value would be stored by the delegate unchanged
    ///
    /// # Errors
    /// Returns `Unbound` before [`PropertyMirror::mirror`]
    pub fn accepts(&self, value: &R) -> Result<bool, MirrorError> {
        let (delegate, _) = self.bound()?;
        Ok(self
            .ty
            .to_serialized(value)
            .is_ok_and(|serialized| delegate.accepts(&serialized)))
    }

    /// Serialized type of the delegate
    ///
    /// # Errors
    /// Returns `Unbound` before [`PropertyMirror::mirror`]
    pub fn delegate_type(&self) -> Result<SerializableType, MirrorError> {
        let (delegate, _) = self.bound()?;
        Ok(delegate.serialized_type().clone())
    }

    /// Delegate's raw serialized value
    ///
    /// # Errors
    /// Returns `Unbound` before [`PropertyMirror::mirror`]
    pub fn serialized_value(&self) -> Result<Option<Value>, MirrorError> {
        let (delegate, _) = self.bound()?;
        Ok(delegate.value())
    }

    fn bound(&self) -> Result<(ConfigLeaf, Arc<AtomicBool>), MirrorError> {
        self.binding
            .lock()
            .as_ref()
            .map(|b| (b.delegate.clone(), Arc::clone(&b.stale)))
            .ok_or(MirrorError::Unbound)
    }
}

impl<R> Drop for PropertyMirror<R> {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.get_mut().take() {
            binding.delegate.remove_change_listener(binding.listener);
        }
    }
}

impl<R> Debug for PropertyMirror<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMirror")
            .field("type", &self.ty)
            .field("bound", &self.binding.lock().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_schema::{config_types, Decimal, DecimalType, StringType};
    use std::sync::atomic::AtomicUsize;

    fn percent_leaf(name: &str) -> ConfigLeaf {
        let ty = DecimalType::new(Some(Decimal::ZERO), Some(Decimal::ONE_HUNDRED), Some(Decimal::ONE))
            .unwrap();
        ConfigLeaf::new(name, ty.into(), Some(Value::from(5))).unwrap()
    }

    #[test]
    fn operations_fail_before_binding() {
        let mirror = PropertyMirror::new(config_types::integer());
        assert_eq!(mirror.value(), Err(MirrorError::Unbound));
        assert_eq!(mirror.set_value(&1), Err(MirrorError::Unbound));
        assert_eq!(mirror.accepts(&1), Err(MirrorError::Unbound));
    }

    #[test]
    fn forwards_reads_and_writes() {
        let leaf = percent_leaf("p");
        let mirror = PropertyMirror::new(config_types::integer());
        mirror.mirror(&leaf).unwrap();

        assert_eq!(mirror.value(), Ok(Some(5)));
        assert_eq!(mirror.set_value(&42), Ok(true));
        assert_eq!(leaf.value(), Some(Value::from(42)));
        assert_eq!(mirror.value(), Ok(Some(42)));

        // in range for i32, rejected by the delegate
        assert_eq!(mirror.set_value(&500), Ok(false));
        assert_eq!(mirror.accepts(&500), Ok(false));
        assert_eq!(mirror.accepts(&7), Ok(true));
    }

    #[test]
    fn cache_refreshes_on_delegate_change() {
        let leaf = percent_leaf("p");
        let conversions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&conversions);
        let ty = config_types::integer().derive(
            move |v| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(v)
            },
            |v: &i32| Ok(*v),
        );
        let mirror = PropertyMirror::new(ty);
        mirror.mirror(&leaf).unwrap();

        mirror.value().unwrap();
        mirror.value().unwrap();
        assert_eq!(conversions.load(Ordering::SeqCst), 1);

        leaf.set_value(Value::from(9));
        assert_eq!(mirror.value(), Ok(Some(9)));
        assert_eq!(conversions.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn rebinding_switches_delegate() {
        let first = percent_leaf("a");
        let second = percent_leaf("b");
        second.set_value(Value::from(77));

        let mirror = PropertyMirror::new(config_types::integer());
        mirror.mirror(&first).unwrap();
        mirror.mirror(&second).unwrap();
        assert_eq!(mirror.value(), Ok(Some(77)));

        mirror.set_value(&3).unwrap();
        assert_eq!(first.value(), Some(Value::from(5)));
        assert_eq!(second.value(), Some(Value::from(3)));
    }

    #[test]
    fn incompatible_delegate_is_rejected() {
        let text = ConfigLeaf::new("t", StringType::unbounded().into(), None).unwrap();
        let mirror = PropertyMirror::new(config_types::integer());
        assert!(matches!(
            mirror.mirror(&text),
            Err(MirrorError::IncompatibleDelegate { .. })
        ));

        let unbounded = ConfigLeaf::new("d", DecimalType::unbounded().into(), None).unwrap();
        assert!(mirror.mirror(&unbounded).is_err());
    }
}
