//! Type-directed conversion between `Value` and JSON
//!
//! JSON objects stand for both maps and records, and JSON strings for both
//! strings and enum tokens, so decoding is driven by the declared
//! [`SerializableType`] through a [`TypeVisitor`].

use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};
use settle_schema::{
    Decimal, DecimalType, EnumType, ListType, MapType, RecordType, SerializableType, StringType,
    TypeVisitor, Value,
};

use crate::error::{SerializeError, SerializeResult};

/// JSON shape name used in diagnostics
pub(crate) fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn decimal_to_json(value: Decimal, path: &str) -> SerializeResult<JsonValue> {
    let rendered = value.normalize().to_string();
    Number::from_str(&rendered)
        .map(JsonValue::Number)
        .map_err(|_| SerializeError::shape(path, "finite number", rendered))
}

fn json_to_decimal(number: &Number) -> Option<Decimal> {
    if let Some(int) = number.as_i64() {
        return Some(Decimal::from(int));
    }
    if let Some(int) = number.as_u64() {
        return Some(Decimal::from(int));
    }
    let rendered = number.to_string();
    Decimal::from_str(&rendered)
        .or_else(|_| Decimal::from_scientific(&rendered))
        .ok()
}

/// Encode a value with no declared type
pub(crate) fn encode_untyped(value: &Value, path: &str) -> SerializeResult<JsonValue> {
    Ok(match value {
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Decimal(d) => decimal_to_json(*d, path)?,
        Value::String(s) => JsonValue::String(s.clone()),
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| encode_untyped(item, &format!("{path}[{i}]")))
                .collect::<SerializeResult<_>>()?,
        ),
        Value::Map(entries) | Value::Record(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), encode_untyped(v, &format!("{path}.{k}"))?)))
                .collect::<SerializeResult<Map<_, _>>>()?,
        ),
    })
}

/// Decode JSON with no declared type; objects become maps
pub(crate) fn decode_untyped(json: &JsonValue, path: &str) -> SerializeResult<Value> {
    Ok(match json {
        JsonValue::Null => return Err(SerializeError::shape(path, "value", "null")),
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Decimal(
            json_to_decimal(n).ok_or_else(|| SerializeError::shape(path, "decimal", n))?,
        ),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Array(items) => Value::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_untyped(item, &format!("{path}[{i}]")))
                .collect::<SerializeResult<_>>()?,
        ),
        JsonValue::Object(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), decode_untyped(v, &format!("{path}.{k}"))?)))
                .collect::<SerializeResult<IndexMap<_, _>>>()?,
        ),
    })
}

/// Renders a value of the visited type as JSON
pub(crate) struct Encoder<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Encoder<'a> {
    pub(crate) fn new(value: &'a Value, path: impl Into<String>) -> Self {
        Self {
            value,
            path: path.into(),
        }
    }

    pub(crate) fn encode(ty: &SerializableType, value: &Value, path: impl Into<String>) -> SerializeResult<JsonValue> {
        ty.accept(&mut Encoder::new(value, path))
    }

    fn mismatch(&self, expected: &'static str) -> SerializeError {
        SerializeError::shape(&self.path, expected, self.value.kind())
    }

    fn text(&self) -> SerializeResult<JsonValue> {
        self.value
            .as_str()
            .map(|s| JsonValue::String(s.to_owned()))
            .ok_or_else(|| self.mismatch("string"))
    }
}

impl TypeVisitor for Encoder<'_> {
    type Output = SerializeResult<JsonValue>;

    fn visit_boolean(&mut self) -> Self::Output {
        self.value
            .as_bool()
            .map(JsonValue::Bool)
            .ok_or_else(|| self.mismatch("boolean"))
    }

    fn visit_decimal(&mut self, _ty: &DecimalType) -> Self::Output {
        let value = self.value.as_decimal().ok_or_else(|| self.mismatch("decimal"))?;
        decimal_to_json(value, &self.path)
    }

    fn visit_string(&mut self, _ty: &StringType) -> Self::Output {
        self.text()
    }

    fn visit_enum(&mut self, _ty: &EnumType) -> Self::Output {
        self.text()
    }

    fn visit_list(&mut self, ty: &ListType) -> Self::Output {
        let items = self.value.as_list().ok_or_else(|| self.mismatch("list"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::encode(ty.element(), item, format!("{}[{i}]", self.path)))
            .collect::<SerializeResult<Vec<_>>>()
            .map(JsonValue::Array)
    }

    fn visit_map(&mut self, ty: &MapType) -> Self::Output {
        let entries = self.value.as_map().ok_or_else(|| self.mismatch("map"))?;
        entries
            .iter()
            .map(|(k, v)| Ok((k.clone(), Self::encode(ty.value(), v, format!("{}.{k}", self.path))?)))
            .collect::<SerializeResult<Map<_, _>>>()
            .map(JsonValue::Object)
    }

    fn visit_record(&mut self, ty: &RecordType) -> Self::Output {
        let fields = self.value.as_record().ok_or_else(|| self.mismatch("record"))?;
        fields
            .iter()
            .map(|(k, v)| {
                let path = format!("{}.{k}", self.path);
                let json = match ty.field(k) {
                    Some(field) => Self::encode(field, v, path)?,
                    None => encode_untyped(v, &path)?,
                };
                Ok((k.clone(), json))
            })
            .collect::<SerializeResult<Map<_, _>>>()
            .map(JsonValue::Object)
    }
}

/// Reads JSON as a value of the visited type
///
/// Decoding only checks shape; constraints are left to the leaf.
pub(crate) struct Decoder<'a> {
    json: &'a JsonValue,
    path: String,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(json: &'a JsonValue, path: impl Into<String>) -> Self {
        Self {
            json,
            path: path.into(),
        }
    }

    pub(crate) fn decode(ty: &SerializableType, json: &JsonValue, path: impl Into<String>) -> SerializeResult<Value> {
        ty.accept(&mut Decoder::new(json, path))
    }

    fn mismatch(&self, expected: &'static str) -> SerializeError {
        SerializeError::shape(&self.path, expected, json_kind(self.json))
    }

    fn text(&self) -> SerializeResult<Value> {
        self.json
            .as_str()
            .map(Value::string)
            .ok_or_else(|| self.mismatch("string"))
    }

    fn object(&self) -> SerializeResult<&'a Map<String, JsonValue>> {
        self.json.as_object().ok_or_else(|| self.mismatch("object"))
    }
}

impl TypeVisitor for Decoder<'_> {
    type Output = SerializeResult<Value>;

    fn visit_boolean(&mut self) -> Self::Output {
        self.json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| self.mismatch("boolean"))
    }

    fn visit_decimal(&mut self, _ty: &DecimalType) -> Self::Output {
        match self.json {
            JsonValue::Number(n) => json_to_decimal(n)
                .map(Value::Decimal)
                .ok_or_else(|| SerializeError::shape(&self.path, "decimal", n)),
            _ => Err(self.mismatch("number")),
        }
    }

    fn visit_string(&mut self, _ty: &StringType) -> Self::Output {
        self.text()
    }

    fn visit_enum(&mut self, _ty: &EnumType) -> Self::Output {
        self.text()
    }

    fn visit_list(&mut self, ty: &ListType) -> Self::Output {
        let items = self.json.as_array().ok_or_else(|| self.mismatch("array"))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| Self::decode(ty.element(), item, format!("{}[{i}]", self.path)))
            .collect::<SerializeResult<Vec<_>>>()
            .map(Value::List)
    }

    fn visit_map(&mut self, ty: &MapType) -> Self::Output {
        self.object()?
            .iter()
            .map(|(k, v)| Ok((k.clone(), Self::decode(ty.value(), v, format!("{}.{k}", self.path))?)))
            .collect::<SerializeResult<IndexMap<_, _>>>()
            .map(Value::Map)
    }

    fn visit_record(&mut self, ty: &RecordType) -> Self::Output {
        self.object()?
            .iter()
            .map(|(k, v)| {
                let path = format!("{}.{k}", self.path);
                let value = match ty.field(k) {
                    Some(field) => Self::decode(field, v, path)?,
                    None => decode_untyped(v, &path)?,
                };
                Ok((k.clone(), value))
            })
            .collect::<SerializeResult<IndexMap<_, _>>>()
            .map(Value::Record)
    }
}
