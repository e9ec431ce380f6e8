//! Testing utilities for the Settle workspace
//!
//! Shared fixtures and tracing setup.

#![allow(missing_docs)]

use settle_schema::{Decimal, DecimalType, EnumType, SerializableType, StringType, Value};
use settle_tree::{ConfigBranch, ConfigLeaf};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honouring `RUST_LOG`; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

pub fn decimal_value(value: i64) -> Value {
    Value::Decimal(dec(value))
}

pub fn stepped(min: i64, max: i64, step: i64) -> SerializableType {
    DecimalType::new(Some(dec(min)), Some(dec(max)), Some(dec(step)))
        .unwrap()
        .into()
}

pub fn non_empty_string() -> SerializableType {
    StringType::new(1, usize::MAX, None).unwrap().into()
}

pub fn mode_enum() -> SerializableType {
    EnumType::new(["A", "B"]).unwrap().into()
}

pub fn leaf(name: &str, ty: SerializableType, default: Option<Value>) -> ConfigLeaf {
    ConfigLeaf::new(name, ty, default).unwrap()
}

/// Fixture tree
///
/// ```text
/// root
/// ├── name   string, min length 1
/// └── child
///     └── mode   enum {A, B}
/// ```
pub struct SampleTree {
    pub root: ConfigBranch,
    pub name: ConfigLeaf,
    pub child: ConfigBranch,
    pub mode: ConfigLeaf,
}

pub fn sample_tree() -> SampleTree {
    let root = ConfigBranch::new("root");
    let name = leaf("name", non_empty_string(), Some(Value::from("settle")));
    let child = ConfigBranch::new("child");
    let mode = leaf("mode", mode_enum(), Some(Value::from("A")));

    child.children().add(mode.clone().into(), false).unwrap();
    root.children().add(name.clone().into(), false).unwrap();
    root.children().add(child.clone().into(), false).unwrap();

    SampleTree {
        root,
        name,
        child,
        mode,
    }
}
