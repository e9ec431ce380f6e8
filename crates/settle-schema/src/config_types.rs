//! Built-in config types
//!
//! Ready-made [`ConfigType`]s for common runtime types. Integer types carry
//! their native range and an increment of one; narrow them with
//! [`ConfigType::with_type`].

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::config_type::ConfigType;
use crate::error::{ConversionError, SchemaError};
use crate::types::{DecimalType, EnumType, ListType, MapType, RecordType, SerializableType, StringType};
use crate::value::{Value, ValueKind};

fn decimal_of(value: &Value) -> Result<Decimal, ConversionError> {
    value
        .as_decimal()
        .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::Decimal, value.kind()))
}

fn str_of(value: &Value) -> Result<&str, ConversionError> {
    value
        .as_str()
        .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::String, value.kind()))
}

/// `bool` ↔ boolean
#[must_use]
pub fn boolean() -> ConfigType<bool> {
    ConfigType::new(
        SerializableType::Boolean,
        |v: &bool| Ok(Value::Bool(*v)),
        |v: &Value| {
            v.as_bool()
                .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::Bool, v.kind()))
        },
    )
}

/// `Decimal` ↔ unbounded decimal
#[must_use]
pub fn decimal() -> ConfigType<Decimal> {
    ConfigType::new(
        DecimalType::unbounded().into(),
        |v: &Decimal| Ok(Value::Decimal(*v)),
        decimal_of,
    )
}

/// `i32` ↔ whole decimal in `i32` range
#[must_use]
pub fn integer() -> ConfigType<i32> {
    ConfigType::new(
        DecimalType::integral(Decimal::from(i32::MIN), Decimal::from(i32::MAX)).into(),
        |v: &i32| Ok(Value::from(*v)),
        |v: &Value| {
            let d = decimal_of(v)?;
            d.to_i32().ok_or_else(|| ConversionError::out_of_range(d, "i32"))
        },
    )
}

/// `i64` ↔ whole decimal in `i64` range
#[must_use]
pub fn long() -> ConfigType<i64> {
    ConfigType::new(
        DecimalType::integral(Decimal::from(i64::MIN), Decimal::from(i64::MAX)).into(),
        |v: &i64| Ok(Value::from(*v)),
        |v: &Value| {
            let d = decimal_of(v)?;
            d.to_i64().ok_or_else(|| ConversionError::out_of_range(d, "i64"))
        },
    )
}

/// `u32` ↔ whole decimal in `[0, u32::MAX]`
#[must_use]
pub fn natural() -> ConfigType<u32> {
    ConfigType::new(
        DecimalType::integral(Decimal::ZERO, Decimal::from(u32::MAX)).into(),
        |v: &u32| Ok(Value::from(*v)),
        |v: &Value| {
            let d = decimal_of(v)?;
            d.to_u32().ok_or_else(|| ConversionError::out_of_range(d, "u32"))
        },
    )
}

/// `f64` ↔ unbounded decimal
///
/// Non-finite floats have no decimal form and fail conversion.
#[must_use]
pub fn double() -> ConfigType<f64> {
    ConfigType::new(
        DecimalType::unbounded().into(),
        |v: &f64| {
            Decimal::from_f64(*v)
                .map(Value::Decimal)
                .ok_or_else(|| ConversionError::out_of_range(v, "decimal"))
        },
        |v: &Value| {
            let d = decimal_of(v)?;
            d.to_f64().ok_or_else(|| ConversionError::out_of_range(d, "f64"))
        },
    )
}

/// `f32` ↔ unbounded decimal
#[must_use]
pub fn float() -> ConfigType<f32> {
    ConfigType::new(
        DecimalType::unbounded().into(),
        |v: &f32| {
            Decimal::from_f32(*v)
                .map(Value::Decimal)
                .ok_or_else(|| ConversionError::out_of_range(v, "decimal"))
        },
        |v: &Value| {
            let d = decimal_of(v)?;
            d.to_f32().ok_or_else(|| ConversionError::out_of_range(d, "f32"))
        },
    )
}

/// `String` ↔ unbounded string
#[must_use]
pub fn string() -> ConfigType<String> {
    ConfigType::new(
        StringType::unbounded().into(),
        |v: &String| Ok(Value::String(v.clone())),
        |v: &Value| str_of(v).map(str::to_string),
    )
}

/// `char` ↔ string of exactly one character
#[must_use]
pub fn character() -> ConfigType<char> {
    ConfigType::new(
        StringType::exact(1).into(),
        |v: &char| Ok(Value::String(v.to_string())),
        |v: &Value| {
            let s = str_of(v)?;
            s.chars()
                .next()
                .ok_or_else(|| ConversionError::out_of_range(format!("{s:?}"), "char"))
        },
    )
}

/// `String` ↔ one of `values`
///
/// # Errors
/// Returns `EmptyEnum` if no values are given
pub fn enumerated<I, S>(values: I) -> Result<ConfigType<String>, SchemaError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Ok(ConfigType::new(
        EnumType::new(values)?.into(),
        |v: &String| Ok(Value::String(v.clone())),
        |v: &Value| str_of(v).map(str::to_string),
    ))
}

/// Rust enum usable as an enumerated config value
pub trait ConfigEnum: Sized + Clone + Send + Sync + 'static {
    /// Every variant
    fn variants() -> &'static [Self];

    /// Serialized token for this variant
    fn token(&self) -> &'static str;
}

/// `E` ↔ enum of its variant tokens
///
/// # Errors
/// Returns `EmptyEnum` if `E` has no variants
pub fn enum_of<E: ConfigEnum>() -> Result<ConfigType<E>, SchemaError> {
    Ok(ConfigType::new(
        EnumType::new(E::variants().iter().map(ConfigEnum::token))?.into(),
        |v: &E| Ok(Value::string(v.token())),
        |v: &Value| {
            let token = str_of(v)?;
            E::variants()
                .iter()
                .find(|variant| variant.token() == token)
                .cloned()
                .ok_or_else(|| ConversionError::Custom(format!("unknown token '{token}'")))
        },
    ))
}

/// `Vec<E>` ↔ list of `element`
#[must_use]
pub fn list_of<E: 'static>(element: &ConfigType<E>) -> ConfigType<Vec<E>> {
    let ser = element.clone();
    let de = element.clone();
    ConfigType::new(
        ListType::of(element.serialized_type().clone()).into(),
        move |items: &Vec<E>| {
            items
                .iter()
                .map(|item| ser.to_serialized(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        },
        move |v: &Value| {
            let items = v
                .as_list()
                .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::List, v.kind()))?;
            items.iter().map(|item| de.to_runtime(item)).collect()
        },
    )
}

/// `IndexSet<E>` ↔ unique list of `element`
#[must_use]
pub fn set_of<E: Hash + Eq + 'static>(element: &ConfigType<E>) -> ConfigType<IndexSet<E>> {
    let ser = element.clone();
    let de = element.clone();
    ConfigType::new(
        ListType::of(element.serialized_type().clone()).unique().into(),
        move |items: &IndexSet<E>| {
            items
                .iter()
                .map(|item| ser.to_serialized(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List)
        },
        move |v: &Value| {
            let items = v
                .as_list()
                .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::List, v.kind()))?;
            items.iter().map(|item| de.to_runtime(item)).collect()
        },
    )
}

/// `IndexMap<String, V>` ↔ map of `value`
#[must_use]
pub fn map_of<V: 'static>(value: &ConfigType<V>) -> ConfigType<IndexMap<String, V>> {
    let ser = value.clone();
    let de = value.clone();
    ConfigType::new(
        MapType::of(value.serialized_type().clone()).into(),
        move |entries: &IndexMap<String, V>| {
            entries
                .iter()
                .map(|(k, item)| ser.to_serialized(item).map(|v| (k.clone(), v)))
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(Value::Map)
        },
        move |v: &Value| {
            let entries = v
                .as_map()
                .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::Map, v.kind()))?;
            entries
                .iter()
                .map(|(k, item)| de.to_runtime(item).map(|v| (k.clone(), v)))
                .collect()
        },
    )
}

/// Record fields ↔ record of `fields`
#[must_use]
pub fn record(fields: RecordType) -> ConfigType<IndexMap<String, Value>> {
    ConfigType::new(
        fields.into(),
        |v: &IndexMap<String, Value>| Ok(Value::Record(v.clone())),
        |v: &Value| {
            v.as_record()
                .cloned()
                .ok_or_else(|| ConversionError::kind_mismatch(ValueKind::Record, v.kind()))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Fast,
        Safe,
    }

    impl ConfigEnum for Mode {
        fn variants() -> &'static [Self] {
            &[Self::Fast, Self::Safe]
        }

        fn token(&self) -> &'static str {
            match self {
                Self::Fast => "FAST",
                Self::Safe => "SAFE",
            }
        }
    }

    #[test]
    fn integer_round_trip_and_range() {
        let ty = integer();
        assert_eq!(ty.to_runtime(&ty.to_serialized(&-17).unwrap()).unwrap(), -17);
        let too_big = Value::from(i64::from(i32::MAX) + 1);
        assert!(matches!(
            ty.to_runtime(&too_big),
            Err(ConversionError::ConstraintViolation { .. })
        ));
    }

    #[test]
    fn natural_rejects_negatives() {
        assert!(natural().to_runtime(&Value::from(-1)).is_err());
    }

    #[test]
    fn double_rejects_non_finite() {
        assert!(double().to_serialized(&f64::NAN).is_err());
        assert_eq!(
            double().to_serialized(&0.5).unwrap(),
            Value::Decimal(Decimal::new(5, 1))
        );
    }

    #[test]
    fn character_requires_one_char() {
        let ty = character();
        assert_eq!(ty.to_runtime(&Value::from("x")).unwrap(), 'x');
        assert!(ty.to_runtime(&Value::from("xy")).is_err());
        assert!(ty.to_runtime(&Value::from("")).is_err());
    }

    #[test]
    fn enum_of_maps_variants() {
        let ty = enum_of::<Mode>().unwrap();
        assert_eq!(ty.to_serialized(&Mode::Safe).unwrap(), Value::from("SAFE"));
        assert_eq!(ty.to_runtime(&Value::from("FAST")).unwrap(), Mode::Fast);
        // correction is a write-path policy, not a conversion
        assert!(ty.to_runtime(&Value::from("fast")).is_err());
    }

    #[test]
    fn list_of_checks_each_element() {
        let ty = list_of(&natural());
        assert_eq!(
            ty.to_serialized(&vec![1, 2]).unwrap(),
            Value::list([Value::from(1), Value::from(2)])
        );
        let bad = Value::list([Value::from(1), Value::from(-2)]);
        assert!(ty.to_runtime(&bad).is_err());
    }

    #[test]
    fn set_of_requires_unique_serialized_list() {
        let ty = set_of(&string());
        assert!(matches!(ty.serialized_type(), SerializableType::List(list) if list.is_unique()));
        let duplicated = Value::list([Value::from("a"), Value::from("a")]);
        assert!(ty.to_runtime(&duplicated).is_err());
        let set = ty.to_runtime(&Value::list([Value::from("b"), Value::from("a")])).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn map_of_preserves_order() {
        let ty = map_of(&boolean());
        let value = Value::map([("z", Value::Bool(true)), ("a", Value::Bool(false))]);
        let runtime = ty.to_runtime(&value).unwrap();
        assert_eq!(runtime.keys().collect::<Vec<_>>(), vec!["z", "a"]);
        assert_eq!(ty.to_serialized(&runtime).unwrap(), value);
    }
}
