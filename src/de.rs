//! Deserialization from parsed tomlet values.
//!
//! Decoding runs in two stages: the [`parser`](crate::parser) turns text into a
//! [`Value`] tree, then [`Deserializer`] walks that tree on behalf of the
//! target type's `Deserialize` implementation.
//!
//! ## Numeric conversions
//!
//! Integer and float values interchange: a float populates an integer field
//! by truncating toward zero, and an integer populates a float field by
//! widening. Range checks are left to serde's primitive visitors.
//!
//! ```rust
//! use serde_tomlet::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Limits { count: u32, ratio: f64 }
//!
//! let limits: Limits = from_str("count = 3.5\nratio = 2\n").unwrap();
//! assert_eq!(limits, Limits { count: 3, ratio: 2.0 });
//! ```

use crate::value::{INLINE_TOKEN, INTEGER_TOKEN, VALUE_TOKEN};
use crate::{Error, Map, Result, Value};
use serde::de::{self, IntoDeserializer};

/// Deserializes Rust values out of an owned [`Value`].
///
/// Created via [`Deserializer::new`]; most users go through
/// [`from_str`](crate::from_str) or [`from_value`](crate::from_value).
pub struct Deserializer {
    value: Value,
}

impl Deserializer {
    pub fn new(value: Value) -> Self {
        Deserializer { value }
    }

    fn mismatch(self, expected: &str) -> Error {
        Error::type_mismatch(expected, self.value.type_name())
    }

    /// Decimal text of an integer too wide for `i64`, as stored by `decode`.
    fn wide_integer(&self) -> Option<&str> {
        match &self.value {
            Value::InlineTable(map) if map.len() == 1 => match map.get(INTEGER_TOKEN) {
                Some(Value::String(digits)) => Some(digits),
                _ => None,
            },
            _ => None,
        }
    }
}

fn visit_wide_integer<'de, V>(digits: &str, visitor: V) -> Result<V::Value>
where
    V: de::Visitor<'de>,
{
    if let Ok(n) = digits.parse::<u64>() {
        visitor.visit_u64(n)
    } else if let Ok(n) = digits.parse::<u128>() {
        visitor.visit_u128(n)
    } else if let Ok(n) = digits.parse::<i128>() {
        visitor.visit_i128(n)
    } else {
        Err(Error::custom(format!("invalid integer `{}`", digits)))
    }
}

macro_rules! deserialize_signed {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                if let Some(digits) = self.wide_integer() {
                    return visit_wide_integer(digits, visitor);
                }
                match self.value {
                    Value::Integer(i) => visitor.visit_i64(i),
                    Value::Float(f) => visitor.visit_i64(f as i64),
                    _ => Err(self.mismatch("integer")),
                }
            }
        )*
    };
}

macro_rules! deserialize_unsigned {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                if let Some(digits) = self.wide_integer() {
                    return visit_wide_integer(digits, visitor);
                }
                match self.value {
                    Value::Integer(i) => visitor.visit_i64(i),
                    Value::Float(f) if f >= 0.0 => visitor.visit_u64(f as u64),
                    Value::Float(f) => visitor.visit_i64(f as i64),
                    _ => Err(self.mismatch("unsigned integer")),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(digits) = self.wide_integer() {
            return visit_wide_integer(digits, visitor);
        }
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Boolean(b) => visitor.visit_bool(b),
            Value::Datetime(dt) => visitor.visit_string(dt.into_string()),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Table(map) | Value::InlineTable(map) => {
                visitor.visit_map(MapDeserializer::new(map))
            }
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Boolean(b) => visitor.visit_bool(b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    deserialize_signed! {
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
    }

    deserialize_unsigned! {
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Float(f) => visitor.visit_f64(f),
            Value::Integer(i) => visitor.visit_f64(i as f64),
            _ => Err(self.mismatch("float")),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Value::String(s) = &self.value {
            let mut chars = s.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                return visitor.visit_char(ch);
            }
        }
        Err(self.mismatch("single character string"))
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            Value::Datetime(dt) => visitor.visit_string(dt.into_string()),
            _ => Err(self.mismatch("string")),
        }
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    /// A value that made it into the tree is always present.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit<V>(self, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type("unit"))
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, _visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        Err(Error::unsupported_type(&format!("unit struct `{}`", name)))
    }

    /// A dynamic [`Value`] target learns that a table was written inline
    /// through a leading marker entry.
    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::InlineTable(map) if name == VALUE_TOKEN => {
                let marked = std::iter::once((INLINE_TOKEN.to_string(), Value::Boolean(true)))
                    .chain(map)
                    .collect();
                visitor.visit_map(MapDeserializer::new(marked))
            }
            value => visitor.visit_newtype_struct(Deserializer::new(value)),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(self.mismatch("array")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Table(map) | Value::InlineTable(map) => {
                visitor.visit_map(MapDeserializer::new(map))
            }
            _ => Err(self.mismatch("table")),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Table(map) | Value::InlineTable(map) if map.len() == 1 => {
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((variant, value)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, value))
                    }
                    None => Err(Error::custom("expected enum variant")),
                }
            }
            _ => Err(self.mismatch("string or single-key table")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: Map) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(Deserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(Deserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl EnumDeserializer {
    fn new(variant: String, value: Value) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(Deserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        Err(Error::type_mismatch("unit variant", self.value.type_name()))
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(Deserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_seq(Deserializer::new(self.value), visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(Deserializer::new(self.value), visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    fn from<T: de::DeserializeOwned>(value: Value) -> Result<T> {
        T::deserialize(Deserializer::new(value))
    }

    #[test]
    fn test_float_truncates_into_integers() {
        assert_eq!(from::<i32>(Value::Float(3.9)).unwrap(), 3);
        assert_eq!(from::<i64>(Value::Float(-2.7)).unwrap(), -2);
        assert_eq!(from::<u8>(Value::Float(7.2)).unwrap(), 7);
    }

    #[test]
    fn test_integer_range_is_checked() {
        assert!(from::<u8>(Value::Integer(300)).is_err());
        assert!(from::<u32>(Value::Integer(-1)).is_err());
        assert_eq!(from::<u16>(Value::Integer(300)).unwrap(), 300);
    }

    #[test]
    fn test_integer_widens_into_float() {
        assert_eq!(from::<f64>(Value::Integer(2)).unwrap(), 2.0);
        assert_eq!(from::<f32>(Value::Float(0.5)).unwrap(), 0.5);
    }

    #[test]
    fn test_mismatch_names_both_shapes() {
        let err = from::<String>(Value::Integer(1)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("string", "integer"));

        let err = from::<bool>(Value::from("yes")).unwrap_err();
        assert_eq!(err, Error::type_mismatch("boolean", "string"));

        let err = from::<Vec<i32>>(Value::Integer(1)).unwrap_err();
        assert_eq!(err, Error::type_mismatch("array", "integer"));
    }

    #[test]
    fn test_map_from_inline_table() {
        let mut map = Map::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("b".to_string(), Value::from(2));
        let decoded: HashMap<String, i32> = from(Value::InlineTable(map)).unwrap();
        assert_eq!(decoded.get("a"), Some(&1));
        assert_eq!(decoded.get("b"), Some(&2));
    }

    #[test]
    fn test_char() {
        assert_eq!(from::<char>(Value::from("x")).unwrap(), 'x');
        assert!(from::<char>(Value::from("xy")).is_err());
    }

    #[test]
    fn test_enums() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Mode {
            Fast,
            Limit(u32),
            Window { from: u32, to: u32 },
        }

        assert_eq!(from::<Mode>(Value::from("Fast")).unwrap(), Mode::Fast);

        let mut limit = Map::new();
        limit.insert("Limit".to_string(), Value::from(5));
        assert_eq!(from::<Mode>(Value::InlineTable(limit)).unwrap(), Mode::Limit(5));

        let mut fields = Map::new();
        fields.insert("from".to_string(), Value::from(1));
        fields.insert("to".to_string(), Value::from(9));
        let mut window = Map::new();
        window.insert("Window".to_string(), Value::InlineTable(fields));
        assert_eq!(
            from::<Mode>(Value::Table(window)).unwrap(),
            Mode::Window { from: 1, to: 9 }
        );
    }

    #[test]
    fn test_unit_is_unsupported() {
        let err = from::<()>(Value::from(1)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn test_wide_integers_decode_into_wide_targets() {
        let mut wide = Map::new();
        wide.insert(INTEGER_TOKEN.to_string(), Value::from(u64::MAX.to_string()));
        assert_eq!(from::<u64>(Value::InlineTable(wide.clone())).unwrap(), u64::MAX);
        assert_eq!(from::<u128>(Value::InlineTable(wide.clone())).unwrap(), u128::from(u64::MAX));
        assert!(from::<i64>(Value::InlineTable(wide)).is_err());
    }

    #[test]
    fn test_datetime_into_string_keeps_text() {
        let dt = crate::Datetime::parse("2024-01-15T10:30:00+00:00").unwrap();
        assert_eq!(from::<String>(Value::Datetime(dt)).unwrap(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Small {
            a: i32,
        }

        let mut map = Map::new();
        map.insert("a".to_string(), Value::from(1));
        map.insert("extra".to_string(), Value::Array(vec![]));
        assert_eq!(from::<Small>(Value::Table(map)).unwrap(), Small { a: 1 });
    }
}
