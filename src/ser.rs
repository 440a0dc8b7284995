//! tomlet serialization.
//!
//! Serialization happens in two layers:
//!
//! - [`ValueSerializer`] turns any `Serialize` value into a [`Value`] tree.
//!   Structs become section tables, maps become inline tables, and `None`
//!   produces nothing at all, so `None` fields vanish from their table.
//! - [`Serializer`] feeds the same tree to the text writer. A table at the
//!   top of the document is written as `name = value` lines followed by one
//!   `[dotted.path]` section for every nested section table.
//!
//! ## Layout
//!
//! Within a table, plain entries come first: names from the
//! [priority list](crate::EncoderOptions::priority) in list order, then the
//! rest in field order. Section tables follow, each introduced by a blank
//! line and a header carrying its full path from the root.
//!
//! ```rust
//! use serde_tomlet::to_string;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Limits { burst: u32 }
//!
//! #[derive(Serialize)]
//! struct Service { name: String, limits: Limits, ports: Vec<u16> }
//!
//! let service = Service {
//!     name: "api".to_string(),
//!     limits: Limits { burst: 10 },
//!     ports: vec![80, 443],
//! };
//!
//! let text = to_string(&service).unwrap();
//! assert_eq!(text, "name = \"api\"\nports = [80, 443]\n\n[limits]\nburst = 10\n");
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde_tomlet::{EncoderOptions, Serializer};
//! use serde::Serialize;
//!
//! let mut serializer = Serializer::new(EncoderOptions::new());
//! vec![1, 2, 3].serialize(&mut serializer).unwrap();
//! assert_eq!(serializer.into_inner(), "[1, 2, 3]");
//! ```

use crate::value::{INTEGER_TOKEN, TABLE_TOKEN};
use crate::{Datetime, EncoderOptions, Error, Map, Result, Value};
use log::trace;
use serde::ser::Serializer as _;
use serde::{ser, Serialize};
use std::fmt;

/// The tomlet text serializer.
///
/// Created via [`Serializer::new`]; the text is taken out with
/// [`Serializer::into_inner`] once a value has been serialized.
pub struct Serializer {
    output: String,
    options: EncoderOptions,
}

impl Serializer {
    pub fn new(options: EncoderOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    fn write_root(&mut self, value: Option<Value>) -> Result<()> {
        match value {
            None => {}
            Some(Value::Table(map)) | Some(Value::InlineTable(map)) => {
                write_table(&mut self.output, &map, &mut Vec::new(), &self.options);
            }
            Some(other) => write_inline_value(&mut self.output, &other, &self.options),
        }
        Ok(())
    }
}

/// Collects a compound value with [`ValueSerializer`], then writes it.
pub struct Compound<'a, C> {
    ser: &'a mut Serializer,
    inner: C,
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a, SerializeVec>;
    type SerializeTuple = Compound<'a, SerializeVec>;
    type SerializeTupleStruct = Compound<'a, SerializeVec>;
    type SerializeTupleVariant = Compound<'a, SerializeTupleVariant>;
    type SerializeMap = Compound<'a, SerializeMap>;
    type SerializeStruct = Compound<'a, SerializeStruct>;
    type SerializeStructVariant = Compound<'a, SerializeStructVariant>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_bool(v)?)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_i64(v)?)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_i128(v)?)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_u64(v)?)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_u128(v)?)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_f64(v)?)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_char(v)?)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_str(v)?)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.write_root(ValueSerializer::new().serialize_bytes(v)?)
    }

    fn serialize_none(self) -> Result<()> {
        Ok(())
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        Err(Error::unsupported_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        Err(Error::unsupported_type(&format!("unit struct `{}`", name)))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        let value = ValueSerializer::new().serialize_unit_variant(name, variant_index, variant)?;
        self.write_root(value)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value =
            ValueSerializer::new().serialize_newtype_variant(name, variant_index, variant, value)?;
        self.write_root(value)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(Compound {
            inner: ValueSerializer::new().serialize_seq(len)?,
            ser: self,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Ok(Compound {
            inner: ValueSerializer::new().serialize_tuple_variant(name, variant_index, variant, len)?,
            ser: self,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(Compound {
            inner: ValueSerializer::new().serialize_map(len)?,
            ser: self,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<Self::SerializeStruct> {
        Ok(Compound {
            inner: ValueSerializer::new().serialize_struct(name, len)?,
            ser: self,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Ok(Compound {
            inner: ValueSerializer::new().serialize_struct_variant(name, variant_index, variant, len)?,
            ser: self,
        })
    }
}

impl<'a, C> ser::SerializeSeq for Compound<'a, C>
where
    C: ser::SerializeSeq<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_element(value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

impl<'a, C> ser::SerializeTuple for Compound<'a, C>
where
    C: ser::SerializeTuple<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_element(value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

impl<'a, C> ser::SerializeTupleStruct for Compound<'a, C>
where
    C: ser::SerializeTupleStruct<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_field(value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

impl<'a, C> ser::SerializeTupleVariant for Compound<'a, C>
where
    C: ser::SerializeTupleVariant<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_field(value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

impl<'a, C> ser::SerializeMap for Compound<'a, C>
where
    C: ser::SerializeMap<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_key(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_value(value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

impl<'a, C> ser::SerializeStruct for Compound<'a, C>
where
    C: ser::SerializeStruct<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_field(key, value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

impl<'a, C> ser::SerializeStructVariant for Compound<'a, C>
where
    C: ser::SerializeStructVariant<Ok = Option<Value>, Error = Error>,
{
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.inner.serialize_field(key, value)
    }

    fn end(self) -> Result<()> {
        let value = self.inner.end()?;
        self.ser.write_root(value)
    }
}

/// Serializes Rust values into [`Value`] trees.
///
/// The output is `None` when there is nothing to write (`Option::None`);
/// containers drop such entries instead of storing a placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueSerializer {
    snapshot: bool,
}

impl ValueSerializer {
    pub fn new() -> Self {
        ValueSerializer::default()
    }

    /// A serializer whose tree decodes back into exactly the value it was
    /// built from: strings are never promoted to timestamps, and integers
    /// outside the `i64` range are kept instead of rejected. `decode` uses it
    /// for the target it overlays.
    pub(crate) fn snapshot() -> Self {
        ValueSerializer { snapshot: true }
    }

    fn out_of_range<N: fmt::Display>(self, v: N) -> Result<Option<Value>> {
        if self.snapshot {
            Ok(Some(single_entry(INTEGER_TOKEN, Value::String(v.to_string()))))
        } else {
            Err(Error::custom(format!("integer {} is out of range", v)))
        }
    }

    fn element<T: Serialize + ?Sized>(self, value: &T) -> Result<Value> {
        value
            .serialize(self)?
            .ok_or_else(|| Error::unsupported_type("`None` inside an array"))
    }
}

pub struct SerializeVec {
    ser: ValueSerializer,
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    ser: ValueSerializer,
    variant: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    ser: ValueSerializer,
    map: Map,
    current_key: Option<String>,
}

pub struct SerializeStruct {
    ser: ValueSerializer,
    map: Map,
}

pub struct SerializeStructVariant {
    ser: ValueSerializer,
    variant: &'static str,
    map: Map,
}

fn single_entry(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::InlineTable(map)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Option<Value>;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Option<Value>> {
        Ok(Some(Value::Boolean(v)))
    }

    fn serialize_i8(self, v: i8) -> Result<Option<Value>> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Option<Value>> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Option<Value>> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Option<Value>> {
        Ok(Some(Value::Integer(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Option<Value>> {
        match i64::try_from(v) {
            Ok(i) => Ok(Some(Value::Integer(i))),
            Err(_) => self.out_of_range(v),
        }
    }

    fn serialize_u8(self, v: u8) -> Result<Option<Value>> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Option<Value>> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Option<Value>> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Option<Value>> {
        match i64::try_from(v) {
            Ok(i) => Ok(Some(Value::Integer(i))),
            Err(_) => self.out_of_range(v),
        }
    }

    fn serialize_u128(self, v: u128) -> Result<Option<Value>> {
        match i64::try_from(v) {
            Ok(i) => Ok(Some(Value::Integer(i))),
            Err(_) => self.out_of_range(v),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Option<Value>> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Option<Value>> {
        if !v.is_finite() {
            return Err(Error::unsupported_type(&format!("non-finite float `{}`", v)));
        }
        Ok(Some(Value::Float(v)))
    }

    fn serialize_char(self, v: char) -> Result<Option<Value>> {
        Ok(Some(Value::String(v.to_string())))
    }

    /// Strings holding an RFC 3339 timestamp become [`Value::Datetime`],
    /// matching how the parser reads quoted timestamps. The timestamp keeps
    /// the string as its text.
    fn serialize_str(self, v: &str) -> Result<Option<Value>> {
        if self.snapshot {
            return Ok(Some(Value::String(v.to_string())));
        }
        Ok(Some(match Datetime::parse(v) {
            Ok(dt) => Value::Datetime(dt),
            Err(_) => Value::String(v.to_string()),
        }))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Option<Value>> {
        let vec = v.iter().map(|&b| Value::Integer(i64::from(b))).collect();
        Ok(Some(Value::Array(vec)))
    }

    fn serialize_none(self) -> Result<Option<Value>> {
        Ok(None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Option<Value>> {
        Err(Error::unsupported_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Option<Value>> {
        Err(Error::unsupported_type(&format!("unit struct `{}`", name)))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Option<Value>> {
        Ok(Some(Value::String(variant.to_string())))
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        let value = value.serialize(self)?;
        if name == TABLE_TOKEN {
            if let Some(Value::InlineTable(map)) = value {
                return Ok(Some(Value::Table(map)));
            }
        }
        Ok(value)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Option<Value>>
    where
        T: ?Sized + Serialize,
    {
        Ok(value
            .serialize(self)?
            .map(|value| single_entry(variant, value)))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            ser: self,
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            ser: self,
            variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            ser: self,
            map: Map::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeStruct> {
        Ok(SerializeStruct {
            ser: self,
            map: Map::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            ser: self,
            variant,
            map: Map::with_capacity(len),
        })
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(self.ser.element(value)?);
        Ok(())
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(Value::Array(self.vec)))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Option<Value>> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Option<Value>> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(self.ser.element(value)?);
        Ok(())
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(single_entry(self.variant, Value::Array(self.vec))))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match key.serialize(self.ser)? {
            Some(Value::String(s)) => {
                self.current_key = Some(s);
                Ok(())
            }
            Some(Value::Datetime(dt)) => {
                self.current_key = Some(dt.into_string());
                Ok(())
            }
            Some(other) => Err(Error::unsupported_type(&format!(
                "map key of type {}, keys must be strings",
                other.type_name()
            ))),
            None => Err(Error::unsupported_type("`None` as a map key")),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        if let Some(value) = value.serialize(self.ser)? {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(Value::InlineTable(self.map)))
    }
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if let Some(value) = value.serialize(self.ser)? {
            self.map.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(Value::Table(self.map)))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Option<Value>;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if let Some(value) = value.serialize(self.ser)? {
            self.map.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn end(self) -> Result<Option<Value>> {
        Ok(Some(single_entry(self.variant, Value::Table(self.map))))
    }
}

/// Writes the entries of `table` as a document body, followed by its
/// section tables. `path` holds the dotted path of `table` from the root.
fn write_table(
    output: &mut String,
    table: &Map,
    path: &mut Vec<String>,
    options: &EncoderOptions,
) {
    let mut plain: Vec<(&String, &Value)> = Vec::with_capacity(table.len());
    let mut sections: Vec<(&String, &Map)> = Vec::new();
    for (key, value) in table {
        match value {
            Value::Table(map) => sections.push((key, map)),
            _ => plain.push((key, value)),
        }
    }

    for name in &options.priority {
        if let Some(pos) = plain.iter().position(|(key, _)| key.as_str() == name.as_str()) {
            let (key, value) = plain.remove(pos);
            write_entry(output, key, value, options);
        }
    }
    for (key, value) in plain {
        write_entry(output, key, value, options);
    }

    for (key, map) in sections {
        path.push(key.clone());
        trace!("writing section [{}]", path.join("."));
        output.push_str("\n[");
        for (i, segment) in path.iter().enumerate() {
            if i > 0 {
                output.push('.');
            }
            write_key(output, segment);
        }
        output.push_str("]\n");
        write_table(output, map, path, options);
        path.pop();
    }
}

fn write_entry(output: &mut String, key: &str, value: &Value, options: &EncoderOptions) {
    write_key(output, key);
    output.push_str(" = ");
    write_inline_value(output, value, options);
    output.push('\n');
}

/// Writes `value` in value position: scalars, `[a, b]` arrays and
/// `{ k = v }` inline tables. Section tables are written inline here too.
pub(crate) fn write_inline_value(output: &mut String, value: &Value, options: &EncoderOptions) {
    match value {
        Value::String(s) => write_string(output, s),
        Value::Integer(i) => output.push_str(&i.to_string()),
        Value::Float(f) => output.push_str(&format_float(*f)),
        Value::Boolean(b) => output.push_str(if *b { "true" } else { "false" }),
        Value::Datetime(dt) if dt.is_bare() => output.push_str(dt.as_str()),
        Value::Datetime(dt) => write_string(output, dt.as_str()),
        Value::Array(elements) => {
            output.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                write_inline_value(output, element, options);
            }
            output.push(']');
        }
        Value::Table(map) | Value::InlineTable(map) => write_inline_table(output, map, options),
    }
}

fn write_inline_table(output: &mut String, map: &Map, options: &EncoderOptions) {
    if map.is_empty() {
        output.push_str("{}");
        return;
    }

    output.push('{');
    if options.inline_spacing {
        output.push(' ');
    }
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        write_key(output, key);
        output.push_str(" = ");
        write_inline_value(output, value, options);
    }
    if options.inline_spacing {
        output.push(' ');
    }
    output.push('}');
}

/// Shortest text that reads back as the same number. Magnitudes past
/// 1e15 switch to exponent form so they are not read back as integers.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.abs() >= 1e15 {
        format!("{:e}", f)
    } else {
        f.to_string()
    }
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_alphabetic = matches!(chars.next(), Some(c) if c.is_alphabetic());
    starts_alphabetic
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        && key != "true"
        && key != "false"
}

fn write_key(output: &mut String, key: &str) {
    if is_bare_key(key) {
        output.push_str(key);
    } else {
        write_string(output, key);
    }
}

fn write_string(output: &mut String, s: &str) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            _ => output.push(ch),
        }
    }
    output.push('"');
}
