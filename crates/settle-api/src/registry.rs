//! Config type registry
//!
//! Provides [`TypeRegistry`], an explicit runtime-type → [`ConfigType`]
//! mapping. There is no global registry: build one (usually with
//! [`TypeRegistry::with_defaults`]) and pass it to the binder.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use settle_schema::{config_types, ConfigType};

struct Entry {
    runtime: &'static str,
    ty: Arc<dyn Any + Send + Sync>,
}

/// Runtime type → config type mapping
#[derive(Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<TypeId, Arc<Entry>>,
}

impl TypeRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Create registry with the built-in scalar types
    ///
    /// `bool`, `Decimal`, `i32`, `i64`, `u32`, `f64`, `f32`, `String`, `char`
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(config_types::boolean());
        registry.register(config_types::decimal());
        registry.register(config_types::integer());
        registry.register(config_types::long());
        registry.register(config_types::natural());
        registry.register(config_types::double());
        registry.register(config_types::float());
        registry.register(config_types::string());
        registry.register(config_types::character());
        registry
    }

    /// Register the config type for `R`, replacing any previous one
    ///
    /// Returns true if a mapping was replaced.
    pub fn register<R: 'static>(&mut self, ty: ConfigType<R>) -> bool {
        let entry = Entry {
            runtime: type_name::<R>(),
            ty: Arc::new(ty),
        };
        self.types.insert(TypeId::of::<R>(), Arc::new(entry)).is_some()
    }

    /// Config type registered for `R`
    #[must_use]
    pub fn get<R: 'static>(&self) -> Option<ConfigType<R>> {
        self.types
            .get(&TypeId::of::<R>())?
            .ty
            .downcast_ref::<ConfigType<R>>()
            .cloned()
    }

    /// Check if `R` has a mapping
    #[inline]
    #[must_use]
    pub fn contains<R: 'static>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<R>())
    }

    /// Remove the mapping for `R`
    #[inline]
    pub fn remove<R: 'static>(&mut self) -> bool {
        self.types.remove(&TypeId::of::<R>()).is_some()
    }

    /// Registered runtime type names, sorted
    #[must_use]
    pub fn runtime_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.types.values().map(|entry| entry.runtime).collect();
        names.sort_unstable();
        names
    }

    /// Number of mappings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Debug for TypeRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.runtime_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_schema::{Decimal, DecimalType, Value};

    #[test]
    fn registry_new_empty() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get::<i32>().is_none());
    }

    #[test]
    fn registry_with_defaults() {
        let registry = TypeRegistry::with_defaults();
        assert_eq!(registry.len(), 9);
        assert!(registry.contains::<bool>());
        assert!(registry.contains::<i32>());
        assert!(registry.contains::<String>());
        assert!(registry.contains::<Decimal>());
        assert!(!registry.contains::<Vec<i32>>());
    }

    #[test]
    fn registry_get_returns_working_type() {
        let registry = TypeRegistry::with_defaults();
        let ty = registry.get::<u32>().unwrap();
        assert_eq!(ty.to_serialized(&7).unwrap(), Value::from(7u32));
        assert!(ty.to_runtime(&Value::from(-1)).is_err());
    }

    #[test]
    fn registry_register_replaces() {
        let mut registry = TypeRegistry::with_defaults();
        let narrow = DecimalType::new(Some(Decimal::ZERO), Some(Decimal::ONE_HUNDRED), Some(Decimal::ONE))
            .unwrap();
        let percent = config_types::integer().with_type(narrow.into()).unwrap();
        assert!(registry.register(percent));
        assert!(registry.get::<i32>().unwrap().to_serialized(&101).is_err());
    }

    #[test]
    fn registry_remove() {
        let mut registry = TypeRegistry::with_defaults();
        assert!(registry.remove::<char>());
        assert!(!registry.remove::<char>());
        assert!(!registry.contains::<char>());
    }

    #[test]
    fn registry_names_list_runtime_types() {
        let mut registry = TypeRegistry::new();
        registry.register(config_types::boolean());
        registry.register(config_types::natural());
        assert_eq!(registry.runtime_names(), vec!["bool", "u32"]);
    }
}
