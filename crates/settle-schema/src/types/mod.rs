//! Serializable type descriptors
//!
//! [`SerializableType`] is a closed union with one variant per kind.
//! Testing and comprehension are exhaustive matches over the variants,
//! each delegating to the kind's own checker:
//! - [`DecimalType`]: bounds and increment
//! - [`StringType`]: length and pattern
//! - [`EnumType`]: valid tokens
//! - [`ListType`]: element type, size, uniqueness
//! - [`MapType`]: value type, size
//! - [`RecordType`]: declared fields

mod decimal;
mod enumeration;
pub(crate) mod list;
mod map;
mod record;
mod string;

use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;

pub use decimal::DecimalType;
pub use enumeration::EnumType;
pub use list::ListType;
pub use map::MapType;
pub use record::RecordType;
pub use string::StringType;

use crate::check::TypeCheckResult;
use crate::value::{Value, ValueKind};

/// Immutable descriptor of a serialized value and its constraints
///
/// Equality and hashing are structural. Instances are cheap to clone and
/// safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SerializableType {
    /// `true` / `false`, no constraints
    Boolean,
    /// Exact decimal
    Decimal(DecimalType),
    /// Text
    String(StringType),
    /// One of a fixed set of tokens
    Enum(EnumType),
    /// Sequence of one element type
    List(ListType),
    /// String-keyed map of one value type
    Map(MapType),
    /// Named fields with their own types
    Record(RecordType),
}

/// Kind tag of a [`SerializableType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// [`SerializableType::Boolean`]
    Boolean,
    /// [`SerializableType::Decimal`]
    Decimal,
    /// [`SerializableType::String`]
    String,
    /// [`SerializableType::Enum`]
    Enum,
    /// [`SerializableType::List`]
    List,
    /// [`SerializableType::Map`]
    Map,
    /// [`SerializableType::Record`]
    Record,
}

impl SerializableType {
    /// Kind of this type
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Boolean => TypeKind::Boolean,
            Self::Decimal(_) => TypeKind::Decimal,
            Self::String(_) => TypeKind::String,
            Self::Enum(_) => TypeKind::Enum,
            Self::List(_) => TypeKind::List,
            Self::Map(_) => TypeKind::Map,
            Self::Record(_) => TypeKind::Record,
        }
    }

    /// Kind of [`Value`] this type checks
    #[inline]
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        match self {
            Self::Boolean => ValueKind::Bool,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::String(_) | Self::Enum(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Record(_) => ValueKind::Record,
        }
    }

    /// Test a value against this type's constraints
    ///
    /// A value of the wrong kind is unrecoverable.
    pub fn test(&self, value: &Value) -> TypeCheckResult {
        match (self, value) {
            (Self::Boolean, Value::Bool(_)) => TypeCheckResult::Accepted,
            (Self::Decimal(ty), Value::Decimal(d)) => ty.test(*d).map(Value::Decimal),
            (Self::String(ty), Value::String(s)) => ty.test(s).map(Value::String),
            (Self::Enum(ty), Value::String(s)) => ty.test(s).map(Value::String),
            (Self::List(ty), Value::List(items)) => ty.test(items).map(Value::List),
            (Self::Map(ty), Value::Map(entries)) => ty.test(entries).map(Value::Map),
            (Self::Record(ty), Value::Record(fields)) => ty.test(fields).map(Value::Record),
            _ => TypeCheckResult::Unrecoverable,
        }
    }

    /// Value passes without correction
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        self.test(value).is_accepted()
    }

    /// Every value `other` accepts is accepted here
    ///
    /// Reflexive and transitive. Types of different kinds never comprehend
    /// each other.
    #[must_use]
    pub fn comprehends(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean, Self::Boolean) => true,
            (Self::Decimal(a), Self::Decimal(b)) => a.comprehends(b),
            (Self::String(a), Self::String(b)) => a.comprehends(b),
            (Self::Enum(a), Self::Enum(b)) => a.comprehends(b),
            (Self::List(a), Self::List(b)) => a.comprehends(b),
            (Self::Map(a), Self::Map(b)) => a.comprehends(b),
            (Self::Record(a), Self::Record(b)) => a.comprehends(b),
            _ => false,
        }
    }

    /// Dispatch to the visitor method for this kind
    pub fn accept<V: TypeVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Boolean => visitor.visit_boolean(),
            Self::Decimal(ty) => visitor.visit_decimal(ty),
            Self::String(ty) => visitor.visit_string(ty),
            Self::Enum(ty) => visitor.visit_enum(ty),
            Self::List(ty) => visitor.visit_list(ty),
            Self::Map(ty) => visitor.visit_map(ty),
            Self::Record(ty) => visitor.visit_record(ty),
        }
    }

    /// A simple value this type accepts, if one is obvious
    ///
    /// Zero, empty or first-token values; `None` when e.g. a minimum length
    /// or size rules out the empty value.
    #[must_use]
    pub fn default_value(&self) -> Option<Value> {
        let candidate = match self {
            Self::Boolean => Value::Bool(false),
            Self::Decimal(ty) => {
                let zero = Value::Decimal(Decimal::ZERO);
                if self.accepts(&zero) {
                    zero
                } else {
                    Value::Decimal(ty.min().or(ty.max())?)
                }
            }
            Self::String(_) => Value::String(String::new()),
            Self::Enum(ty) => Value::String(ty.values().next()?.to_string()),
            Self::List(_) => Value::List(Vec::new()),
            Self::Map(_) => Value::Map(indexmap::IndexMap::new()),
            Self::Record(ty) => Value::Record(
                ty.fields()
                    .map(|(name, field)| Some((name.to_string(), field.default_value()?)))
                    .collect::<Option<_>>()?,
            ),
        };
        self.accepts(&candidate).then_some(candidate)
    }
}

impl Display for SerializableType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Decimal(ty) => write!(f, "{ty}"),
            Self::String(ty) => write!(f, "{ty}"),
            Self::Enum(ty) => write!(f, "{ty}"),
            Self::List(ty) => write!(f, "{ty}"),
            Self::Map(ty) => write!(f, "{ty}"),
            Self::Record(ty) => write!(f, "{ty}"),
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::String => "string",
            Self::Enum => "enum",
            Self::List => "list",
            Self::Map => "map",
            Self::Record => "record",
        };
        f.write_str(name)
    }
}

impl From<DecimalType> for SerializableType {
    fn from(ty: DecimalType) -> Self {
        Self::Decimal(ty)
    }
}

impl From<StringType> for SerializableType {
    fn from(ty: StringType) -> Self {
        Self::String(ty)
    }
}

impl From<EnumType> for SerializableType {
    fn from(ty: EnumType) -> Self {
        Self::Enum(ty)
    }
}

impl From<ListType> for SerializableType {
    fn from(ty: ListType) -> Self {
        Self::List(ty)
    }
}

impl From<MapType> for SerializableType {
    fn from(ty: MapType) -> Self {
        Self::Map(ty)
    }
}

impl From<RecordType> for SerializableType {
    fn from(ty: RecordType) -> Self {
        Self::Record(ty)
    }
}

/// Per-kind dispatch over a [`SerializableType`]
///
/// Serializer adapters implement this to encode or decode values by kind.
pub trait TypeVisitor {
    /// Result of visiting one type
    type Output;

    /// Visit [`SerializableType::Boolean`]
    fn visit_boolean(&mut self) -> Self::Output;

    /// Visit [`SerializableType::Decimal`]
    fn visit_decimal(&mut self, ty: &DecimalType) -> Self::Output;

    /// Visit [`SerializableType::String`]
    fn visit_string(&mut self, ty: &StringType) -> Self::Output;

    /// Visit [`SerializableType::Enum`]
    fn visit_enum(&mut self, ty: &EnumType) -> Self::Output;

    /// Visit [`SerializableType::List`]
    fn visit_list(&mut self, ty: &ListType) -> Self::Output;

    /// Visit [`SerializableType::Map`]
    fn visit_map(&mut self, ty: &MapType) -> Self::Output;

    /// Visit [`SerializableType::Record`]
    fn visit_record(&mut self, ty: &RecordType) -> Self::Output;
}
