//! Dynamic value representation for tomlet documents.
//!
//! [`Value`] is the generic tree produced by the parser before it is mapped
//! onto a typed structure. It is also what [`to_value`](crate::to_value)
//! produces when a typed value is inspected dynamically.
//!
//! ## Creating Values
//!
//! ```rust
//! use serde_tomlet::Value;
//!
//! let flag = Value::from(true);
//! let count = Value::from(42);
//! let name = Value::from("hello");
//! assert!(flag.is_bool() && count.is_integer() && name.is_string());
//! ```
//!
//! ## Parsing
//!
//! ```rust
//! use serde_tomlet::Value;
//!
//! let doc: Value = "[server]\nport = 8080\n".parse().unwrap();
//! let port = doc
//!     .get("server")
//!     .and_then(|server| server.get("port"))
//!     .and_then(Value::as_integer);
//! assert_eq!(port, Some(8080));
//! ```

use crate::{Datetime, Error, Map};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Newtype-struct name used to tell tomlet serializers that a map is a
/// section table rather than an inline table. Other serializers only see an
/// ordinary newtype around a map.
pub(crate) const TABLE_TOKEN: &str = "$__serde_tomlet_private_table";

/// Newtype-struct name [`Value`] deserializes through. The crate's own
/// deserializer answers it by flagging inline tables with [`INLINE_TOKEN`].
pub(crate) const VALUE_TOKEN: &str = "$__serde_tomlet_private_value";

/// Leading map key marking an inline table for [`Value`]'s visitor.
pub(crate) const INLINE_TOKEN: &str = "$__serde_tomlet_private_inline";

/// Single key of the inline table that carries an integer outside the `i64`
/// range, as decimal text, while `decode` snapshots its target.
pub(crate) const INTEGER_TOKEN: &str = "$__serde_tomlet_private_integer";

/// A dynamically-typed representation of any tomlet value.
///
/// `Table` and `InlineTable` hold the same data; the distinction records how
/// the table was written (`[section]` header versus `{ k = v }`) and drives
/// how the encoder renders it.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Array(Vec<Value>),
    Table(Map),
    InlineTable(Map),
}

impl Value {
    /// Returns the name of this value's shape, as used in error messages.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::Value;
    ///
    /// assert_eq!(Value::from(1).type_name(), "integer");
    /// assert_eq!(Value::from("x").type_name(), "string");
    /// ```
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Datetime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
            Value::InlineTable(_) => "inline table",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Value::Datetime(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Returns `true` for both section tables and inline tables.
    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Value::Table(_) | Value::InlineTable(_))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `f64`, widening integers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::Value;
    ///
    /// assert_eq!(Value::Float(3.5).as_float(), Some(3.5));
    /// assert_eq!(Value::Integer(2).as_float(), Some(2.0));
    /// assert_eq!(Value::from("2").as_float(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Datetime(dt) => Some(dt.value()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the entries of a section table or inline table.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&Map> {
        match self {
            Value::Table(map) | Value::InlineTable(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_table_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Table(map) | Value::InlineTable(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a table.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_table().and_then(|map| map.get(key))
    }

    /// Overlays `other` onto `self`.
    ///
    /// When both sides are tables the entries merge key by key, recursively;
    /// in every other case `other` replaces `self`.
    pub(crate) fn merge(&mut self, other: Value) {
        let overlay = match other {
            Value::Table(map) | Value::InlineTable(map) if self.is_table() => map,
            other => {
                *self = other;
                return;
            }
        };
        if let Some(base) = self.as_table_mut() {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => existing.merge(value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way the encoder writes it in value position.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        crate::ser::write_inline_value(&mut out, self, &crate::EncoderOptions::default());
        f.write_str(&out)
    }
}

impl FromStr for Value {
    type Err = Error;

    /// Parses a whole document into its root [`Value::Table`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse(s)
    }
}

struct SectionTable<'a>(&'a Map);

impl Serialize for SectionTable<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Datetime(dt) => serializer.serialize_str(dt.as_str()),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Table(map) => {
                serializer.serialize_newtype_struct(TABLE_TOKEN, &SectionTable(map))
            }
            Value::InlineTable(map) => SectionTable(map).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid tomlet value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Value::Integer)
                    .map_err(|_| E::custom(format!("integer {} is out of range", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(match Datetime::parse(value) {
                    Ok(dt) => Value::Datetime(dt),
                    Err(_) => Value::String(value.to_string()),
                })
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(match Datetime::parse(&value) {
                    Ok(dt) => Value::Datetime(dt),
                    Err(_) => Value::String(value),
                })
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_newtype_struct<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(ValueVisitor)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = Map::new();
                let mut inline = false;
                while let Some(key) = map.next_key::<String>()? {
                    if key == INLINE_TOKEN {
                        map.next_value::<de::IgnoredAny>()?;
                        inline = true;
                        continue;
                    }
                    let value = map.next_value()?;
                    values.insert(key, value);
                }
                Ok(if inline {
                    Value::InlineTable(values)
                } else {
                    Value::Table(values)
                })
            }
        }

        deserializer.deserialize_newtype_struct(VALUE_TOKEN, ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Float(f) => Ok(f.trunc() as i64),
            other => Err(Error::type_mismatch("integer", other.type_name())),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_float()
            .ok_or_else(|| Error::type_mismatch("float", value.type_name()))
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(Error::type_mismatch("boolean", other.type_name())),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            Value::Datetime(dt) => Ok(dt.into_string()),
            other => Err(Error::type_mismatch("string", other.type_name())),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8 i16 i32 i64 u8 u16 u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Datetime> for Value {
    fn from(value: Datetime) -> Self {
        Value::Datetime(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Datetime(value.into())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::Datetime(value.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Table(value)
    }
}
