use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use settle_api::{BindError, Bindable, FieldTable, SchemaBinder, TreeBuilder, TypeRegistry};
use settle_schema::{config_types, ConfigEnum, Value};
use settle_test_utils::init_tracing;
use settle_tree::{ConfigBranch, PropertyMirror};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Low,
    High,
}

impl ConfigEnum for Level {
    fn variants() -> &'static [Self] {
        &[Level::Low, Level::High]
    }

    fn token(&self) -> &'static str {
        match self {
            Level::Low => "LOW",
            Level::High => "HIGH",
        }
    }
}

#[derive(Debug)]
struct Worker {
    threads: u32,
    level: Level,
    tags: Vec<String>,
}

impl Bindable for Worker {
    fn fields() -> FieldTable<Self> {
        FieldTable::new()
            .field_with(
                "threads",
                |w: &Worker| w.threads,
                |w, v| w.threads = v,
                |f| f.with_comment("worker threads"),
            )
            .field("level", |w: &Worker| w.level, |w, v| w.level = v)
            .field("tags", |w: &Worker| w.tags.clone(), |w, v| w.tags = v)
    }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::with_defaults();
    registry.register(config_types::enum_of::<Level>().unwrap());
    registry.register(config_types::list_of(&config_types::string()));
    registry
}

fn worker() -> Arc<Mutex<Worker>> {
    Arc::new(Mutex::new(Worker {
        threads: 4,
        level: Level::Low,
        tags: vec!["a".into()],
    }))
}

#[test]
fn bound_host_follows_tree_writes() {
    init_tracing();
    let registry = registry();
    let host = worker();
    let branch = SchemaBinder::new(&registry).bind("worker", &host).unwrap();

    let level = branch.lookup_leaf(&"level".parse().unwrap()).unwrap();
    assert_eq!(level.value(), Some(Value::from("LOW")));
    assert!(level.set_value(Value::from("high")));
    assert_eq!(host.lock().level, Level::High);

    let tags = branch.lookup_leaf(&"tags".parse().unwrap()).unwrap();
    assert!(tags.set_value(Value::list([Value::from("x"), Value::from("y")])));
    assert_eq!(host.lock().tags, vec!["x".to_string(), "y".to_string()]);

    // reset restores the default captured at bind time
    level.reset();
    assert_eq!(host.lock().level, Level::Low);
}

#[test]
fn missing_registration_is_reported_per_field() {
    init_tracing();
    let registry = TypeRegistry::with_defaults();
    let host = worker();
    let err = SchemaBinder::new(&registry).bind("worker", &host).unwrap_err();

    assert!(matches!(&err, BindError::MissingTypeMapping { field, .. } if field == "level"));
    let message = err.to_string();
    assert!(message.contains("level"));
    assert!(message.contains("Worker"));
}

#[test]
fn dropped_host_stops_write_back() {
    init_tracing();
    let registry = registry();
    let host = worker();
    let branch = SchemaBinder::new(&registry).bind("worker", &host).unwrap();
    drop(host);

    let threads = branch.lookup_leaf(&"threads".parse().unwrap()).unwrap();
    assert!(threads.set_value(Value::from(8)));
    assert_eq!(threads.value(), Some(Value::from(8)));
}

#[test]
fn bound_branch_joins_a_built_tree() {
    init_tracing();
    let registry = registry();
    let host = worker();
    let root = TreeBuilder::root()
        .leaf("enabled", settle_schema::SerializableType::Boolean, true)
        .build()
        .unwrap();

    let pool = ConfigBranch::new("pool");
    root.children().add(pool.clone().into(), false).unwrap();
    SchemaBinder::new(&registry).bind_into(&pool, &host).unwrap();

    let threads = root.lookup_leaf(&"pool.threads".parse().unwrap()).unwrap();
    assert_eq!(threads.path().to_string(), "pool.threads");
    assert_eq!(threads.comment().as_deref(), Some("worker threads"));

    let mirror = PropertyMirror::new(config_types::natural());
    mirror.mirror(&threads).unwrap();
    assert_eq!(mirror.value(), Ok(Some(4)));
    mirror.set_value(&16).unwrap();
    assert_eq!(host.lock().threads, 16);
}
