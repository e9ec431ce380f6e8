//! Descriptor-driven binding of host objects
//!
//! A host type lists its fields once, in a [`FieldTable`]: name, accessor
//! pair, and optionally a comment or a narrowed serialized type. The
//! [`SchemaBinder`] turns that table into one leaf per field, typed through
//! a [`TypeRegistry`], defaulted to the host's current value and wired with
//! a listener that writes every change back into the host.
//!
//! Write-back locks the host, so do not write to a bound leaf while holding
//! the host's lock.

use std::any::type_name;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use settle_schema::SerializableType;
use settle_tree::{ConfigBranch, ConfigLeaf};
use tracing::{debug, warn};

use crate::error::BindError;
use crate::registry::TypeRegistry;

type LeafFactory<H> =
    Arc<dyn Fn(&FieldDescriptor<H>, &TypeRegistry, &Arc<Mutex<H>>) -> Result<ConfigLeaf, BindError> + Send + Sync>;

/// Host type that can describe its configurable fields
pub trait Bindable: Sized + Send + 'static {
    /// Field table for this type
    fn fields() -> FieldTable<Self>;
}

/// One bindable field of a host type
pub struct FieldDescriptor<H> {
    name: String,
    host: &'static str,
    runtime: &'static str,
    comment: Option<String>,
    narrowed: Option<SerializableType>,
    factory: LeafFactory<H>,
}

impl<H> FieldDescriptor<H> {
    /// Field name, also the leaf name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runtime type name of the field
    #[inline]
    #[must_use]
    pub fn runtime_type(&self) -> &'static str {
        self.runtime
    }

    /// Comment copied onto the leaf
    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Attach a comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Narrow the registered type for this field
    ///
    /// Checked at bind time; widening fails with `BindError::Narrowing`.
    #[must_use]
    pub fn narrowed_to(mut self, ty: impl Into<SerializableType>) -> Self {
        self.narrowed = Some(ty.into());
        self
    }
}

impl<H> Debug for FieldDescriptor<H> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("runtime", &self.runtime)
            .field("narrowed", &self.narrowed)
            .finish_non_exhaustive()
    }
}

/// Ordered field descriptors of one host type
#[derive(Debug)]
pub struct FieldTable<H> {
    fields: Vec<FieldDescriptor<H>>,
}

impl<H: Send + 'static> FieldTable<H> {
    /// Empty table
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field read by `get` and written by `set`
    #[must_use]
    pub fn field<R: 'static>(self, name: impl Into<String>, get: fn(&H) -> R, set: fn(&mut H, R)) -> Self {
        self.field_with(name, get, set, |field| field)
    }

    /// Add a field and adjust its descriptor
    #[must_use]
    pub fn field_with<R: 'static>(
        mut self,
        name: impl Into<String>,
        get: fn(&H) -> R,
        set: fn(&mut H, R),
        configure: impl FnOnce(FieldDescriptor<H>) -> FieldDescriptor<H>,
    ) -> Self {
        let descriptor = FieldDescriptor {
            name: name.into(),
            host: type_name::<H>(),
            runtime: type_name::<R>(),
            comment: None,
            narrowed: None,
            factory: Arc::new(move |field: &FieldDescriptor<H>, registry: &TypeRegistry, host: &Arc<Mutex<H>>| {
                bind_field(field, registry, host, get, set)
            }),
        };
        self.fields.push(configure(descriptor));
        self
    }

    /// Descriptors in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor<H>> {
        self.fields.iter()
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// No fields
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<H: Send + 'static> Default for FieldTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

fn bind_field<H, R>(
    field: &FieldDescriptor<H>,
    registry: &TypeRegistry,
    host: &Arc<Mutex<H>>,
    get: fn(&H) -> R,
    set: fn(&mut H, R),
) -> Result<ConfigLeaf, BindError>
where
    H: Send + 'static,
    R: 'static,
{
    let base = registry.get::<R>().ok_or_else(|| BindError::MissingTypeMapping {
        field: field.name.clone(),
        host: field.host,
        runtime: field.runtime,
    })?;
    let ty = match &field.narrowed {
        Some(narrowed) => base
            .with_type(narrowed.clone())
            .map_err(|source| BindError::Narrowing {
                field: field.name.clone(),
                host: field.host,
                source,
            })?,
        None => base,
    };

    let current = get(&host.lock());
    let default = ty.to_serialized(&current).map_err(|source| BindError::Conversion {
        field: field.name.clone(),
        host: field.host,
        source,
    })?;

    let leaf = ConfigLeaf::new(field.name.clone(), ty.serialized_type().clone(), Some(default))?;
    leaf.set_comment(field.comment.clone());

    let target = Arc::downgrade(host);
    let name = field.name.clone();
    leaf.add_change_listener(move |_, new| {
        let (Some(host), Some(new)) = (target.upgrade(), new) else {
            return;
        };
        match ty.to_runtime(new) {
            Ok(value) => set(&mut host.lock(), value),
            Err(err) => warn!(field = %name, error = %err, "write-back failed"),
        }
    });
    Ok(leaf)
}

/// Builds leaves for [`Bindable`] hosts
#[derive(Debug, Clone, Copy)]
pub struct SchemaBinder<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> SchemaBinder<'r> {
    /// Binder resolving field types through `registry`
    #[inline]
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Bind `host` into a new branch named `name`
    ///
    /// # Errors
    /// - `MissingTypeMapping` naming the first unmapped field and the host
    /// - `Narrowing` if a declared narrowing widens the registered type
    /// - `Conversion` if a current host value is outside its field's type
    /// - `Tree` for duplicate field names
    pub fn bind<H: Bindable>(&self, name: impl Into<String>, host: &Arc<Mutex<H>>) -> Result<ConfigBranch, BindError> {
        let branch = ConfigBranch::new(name);
        self.bind_into(&branch, host)?;
        Ok(branch)
    }

    /// Bind `host` as children of an existing branch
    ///
    /// Every leaf is created before any is attached, so a failed bind
    /// leaves the branch untouched unless two fields share a name.
    ///
    /// # Errors
    /// Same as [`SchemaBinder::bind`]
    pub fn bind_into<H: Bindable>(&self, branch: &ConfigBranch, host: &Arc<Mutex<H>>) -> Result<(), BindError> {
        let table = H::fields();
        let leaves = table
            .iter()
            .map(|field| (field.factory)(field, self.registry, host))
            .collect::<Result<Vec<_>, _>>()?;

        let children = branch.children();
        for leaf in leaves {
            children.add(leaf.into(), false)?;
        }
        debug!(host = type_name::<H>(), fields = table.len(), "bound host");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settle_schema::{Decimal, DecimalType, Value};
    use settle_tree::TreeError;

    #[derive(Debug, Clone, PartialEq)]
    struct Server {
        port: u32,
        verbose: bool,
        name: String,
    }

    impl Bindable for Server {
        fn fields() -> FieldTable<Self> {
            FieldTable::new()
                .field_with(
                    "port",
                    |s: &Server| s.port,
                    |s, v| s.port = v,
                    |f| f.with_comment("listen port").narrowed_to(port_type()),
                )
                .field("verbose", |s: &Server| s.verbose, |s, v| s.verbose = v)
                .field("name", |s: &Server| s.name.clone(), |s, v| s.name = v)
        }
    }

    fn port_type() -> DecimalType {
        DecimalType::new(Some(Decimal::ONE), Some(Decimal::from(65535)), Some(Decimal::ONE)).unwrap()
    }

    fn server() -> Arc<Mutex<Server>> {
        Arc::new(Mutex::new(Server {
            port: 8080,
            verbose: false,
            name: "edge".into(),
        }))
    }

    #[test]
    fn binds_one_leaf_per_field_with_host_defaults() {
        let registry = TypeRegistry::with_defaults();
        let host = server();
        let branch = SchemaBinder::new(&registry).bind("server", &host).unwrap();

        assert_eq!(branch.children().names(), vec!["port", "verbose", "name"]);
        let port = branch.lookup_leaf(&"port".parse().unwrap()).unwrap();
        assert_eq!(port.value(), Some(Value::from(8080u32)));
        assert_eq!(port.comment().as_deref(), Some("listen port"));
        assert_eq!(port.serialized_type(), &SerializableType::from(port_type()));
    }

    #[test]
    fn leaf_writes_reach_the_host() {
        let registry = TypeRegistry::with_defaults();
        let host = server();
        let branch = SchemaBinder::new(&registry).bind("server", &host).unwrap();

        let port = branch.lookup_leaf(&"port".parse().unwrap()).unwrap();
        assert!(port.set_value(Value::from(9090)));
        assert!(!port.set_value(Value::from(0)));
        let verbose = branch.lookup_leaf(&"verbose".parse().unwrap()).unwrap();
        assert!(verbose.set_value(Value::Bool(true)));

        let server = host.lock().clone();
        assert_eq!(server.port, 9090);
        assert!(server.verbose);
    }

    #[derive(Debug)]
    struct Unmapped {
        tags: Vec<String>,
    }

    impl Bindable for Unmapped {
        fn fields() -> FieldTable<Self> {
            FieldTable::new().field("tags", |u: &Unmapped| u.tags.clone(), |u, v| u.tags = v)
        }
    }

    #[test]
    fn missing_mapping_names_field_and_host() {
        let registry = TypeRegistry::with_defaults();
        let host = Arc::new(Mutex::new(Unmapped { tags: Vec::new() }));
        let err = SchemaBinder::new(&registry).bind("u", &host).unwrap_err();

        let BindError::MissingTypeMapping { field, host, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(field, "tags");
        assert!(host.ends_with("Unmapped"));
        assert!(err.to_string().contains("tags"));
    }

    #[test]
    fn host_value_outside_narrowed_type_fails() {
        let registry = TypeRegistry::with_defaults();
        let host = server();
        host.lock().port = 0;
        let err = SchemaBinder::new(&registry).bind("server", &host).unwrap_err();
        assert!(matches!(err, BindError::Conversion { ref field, .. } if field == "port"));
    }

    #[derive(Debug)]
    struct Twice {
        flag: bool,
    }

    impl Bindable for Twice {
        fn fields() -> FieldTable<Self> {
            FieldTable::new()
                .field("flag", |t: &Twice| t.flag, |t, v| t.flag = v)
                .field("flag", |t: &Twice| t.flag, |t, v| t.flag = v)
        }
    }

    #[test]
    fn duplicate_field_names_are_structural_errors() {
        let registry = TypeRegistry::with_defaults();
        let host = Arc::new(Mutex::new(Twice { flag: true }));
        assert!(matches!(
            SchemaBinder::new(&registry).bind("t", &host),
            Err(BindError::Tree(TreeError::DuplicateChild { .. }))
        ));
    }

    #[test]
    fn widening_narrowing_is_rejected() {
        #[derive(Debug)]
        struct Wide {
            level: i32,
        }
        impl Bindable for Wide {
            fn fields() -> FieldTable<Self> {
                FieldTable::new().field_with(
                    "level",
                    |w: &Wide| w.level,
                    |w, v| w.level = v,
                    |f| f.narrowed_to(DecimalType::unbounded()),
                )
            }
        }

        let registry = TypeRegistry::with_defaults();
        let host = Arc::new(Mutex::new(Wide { level: 1 }));
        assert!(matches!(
            SchemaBinder::new(&registry).bind("w", &host),
            Err(BindError::Narrowing { .. })
        ));
    }
}
