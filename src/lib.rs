//! # serde_tomlet
//!
//! A Serde-compatible serialization library for tomlet, a small TOML-like
//! configuration format.
//!
//! ## What is tomlet?
//!
//! A tomlet document is a table of `key = value` lines, optionally split into
//! `[section]` tables:
//!
//! ```text
//! # service configuration
//! name = "lms-api"
//! replicas = 3
//! started = 2024-01-15T10:30:00Z
//!
//! [database]
//! host = "db.internal"
//! pool = { min = 1, max = 8 }
//! ```
//!
//! Values are strings, integers, floats, booleans, RFC 3339 timestamps,
//! arrays and inline tables. See the [`format`] module for the full grammar.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_tomlet::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Database {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     name: String,
//!     debug: bool,
//!     database: Database,
//! }
//!
//! let config = Config {
//!     name: "lms-api".to_string(),
//!     debug: false,
//!     database: Database { host: "db.internal".to_string(), port: 5432 },
//! };
//!
//! let text = to_string(&config).unwrap();
//! assert_eq!(
//!     text,
//!     "name = \"lms-api\"\ndebug = false\n\n[database]\nhost = \"db.internal\"\nport = 5432\n"
//! );
//!
//! let back: Config = from_str(&text).unwrap();
//! assert_eq!(config, back);
//! ```
//!
//! ## Field Names and Omission
//!
//! Field binding uses serde attributes:
//!
//! - `#[serde(rename = "name")]` stores the field under another key
//! - `#[serde(skip)]` leaves the field out in both directions
//! - `#[serde(skip_serializing_if = "serde_tomlet::is_empty")]` omits the
//!   field while it holds its type's zero value
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Course {
//!     #[serde(rename = "title")]
//!     name: String,
//!     #[serde(skip_serializing_if = "serde_tomlet::is_empty")]
//!     summary: String,
//!     #[serde(skip)]
//!     cache_key: u64,
//! }
//!
//! let course = Course { name: "Rust".into(), summary: String::new(), cache_key: 7 };
//! assert_eq!(serde_tomlet::to_string(&course).unwrap(), "title = \"Rust\"\n");
//! ```
//!
//! ## Updating Existing Values
//!
//! [`decode`] fills an existing value in place: keys present in the document
//! overwrite the matching fields, everything else keeps its current value.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Limits { burst: u32, rate: u32 }
//!
//! let mut limits = Limits { burst: 10, rate: 100 };
//! serde_tomlet::decode("rate = 250\n", &mut limits).unwrap();
//! assert_eq!(limits, Limits { burst: 10, rate: 250 });
//! ```
//!
//! ## Dynamic Values with the tomlet! Macro
//!
//! ```rust
//! use serde_tomlet::{tomlet, Value};
//!
//! let data = tomlet!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["rust", "serde"]
//! });
//!
//! assert_eq!(data.get("name").and_then(Value::as_str), Some("Alice"));
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: `debug!`
//! records for every decode and encode call, `trace!` for each section table
//! parsed or written. No logger is installed by the library.

pub mod datetime;
pub mod de;
pub mod error;
pub mod format;
pub mod lexer;
pub mod macros;
pub mod map;
pub mod options;
pub mod parser;
pub mod ser;
pub mod value;

pub use datetime::Datetime;
pub use de::Deserializer;
pub use error::{Error, Result};
pub use map::Map;
pub use options::EncoderOptions;
pub use ser::{Serializer, ValueSerializer};
pub use value::Value;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Parses a document into its root [`Value::Table`].
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{parse, Value};
///
/// let doc = parse("[nested]\nvalue = 1\n").unwrap();
/// let nested = doc.get("nested").unwrap();
/// assert!(matches!(nested, Value::Table(_)));
/// assert_eq!(nested.get("value"), Some(&Value::Integer(1)));
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] with the line and column of the first problem.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Value> {
    parser::parse_str(text).map(Value::Table)
}

/// Decodes `text` into an existing value.
///
/// Fields that the document does not mention keep their current value;
/// nested section tables are merged the same way, key by key.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Default)]
/// struct Settings { title: String, count: i64 }
///
/// let mut settings = Settings::default();
/// serde_tomlet::decode("title = \"abc\"\ncount = 3.5\n", &mut settings).unwrap();
/// assert_eq!(settings.title, "abc");
/// assert_eq!(settings.count, 3);
/// ```
///
/// # Skipped fields
///
/// `target` is rebuilt through its `Serialize` and `Deserialize` impls, so a
/// field marked `#[serde(skip)]` (or `skip_deserializing`) is set the way
/// serde fills it on any deserialization: from `Default` or its
/// `#[serde(default = "...")]` function. Keep state that must survive a
/// decode out of skipped fields. Every other field the document does not
/// mention keeps its current value exactly, including strings that look like
/// timestamps and integers wider than `i64`.
///
/// # Errors
///
/// Returns a parse error for malformed text, or a type error when a value
/// does not fit the field it targets. `target` is left unchanged on error.
pub fn decode<T>(text: &str, target: &mut T) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    debug!("decoding {} bytes in place", text.len());
    let document = parse(text)?;
    let mut merged = target
        .serialize(ValueSerializer::snapshot())?
        .unwrap_or_else(|| Value::Table(Map::new()));
    merged.merge(document);
    *target = from_value(merged)?;
    debug!("decode finished");
    Ok(())
}

/// Encodes `value` as document text in bytes.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Flag { flag: bool }
///
/// let bytes = serde_tomlet::encode(&Flag { flag: true }).unwrap();
/// assert_eq!(bytes, b"flag = true\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for shapes with no tomlet form, such
/// as `()` or maps with non-string keys.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

/// Serialize any `T: Serialize` to a tomlet string.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized (e.g., unsupported types).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, EncoderOptions::default())
}

/// Serialize any `T: Serialize` to a tomlet string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{to_string_with_options, EncoderOptions};
/// use std::collections::BTreeMap;
///
/// let mut pool = BTreeMap::new();
/// pool.insert("min", 1);
/// let mut doc = BTreeMap::new();
/// doc.insert("pool", pool);
///
/// let options = EncoderOptions::new().with_inline_spacing(false);
/// assert_eq!(to_string_with_options(&doc, options).unwrap(), "pool = {min = 1}\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: EncoderOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    let text = serializer.into_inner();
    debug!("encoded {} bytes", text.len());
    Ok(text)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// Structs become [`Value::Table`], maps become [`Value::InlineTable`].
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(matches!(value, Value::Table(_)));
/// assert_eq!(value.get("x"), Some(&Value::Integer(1)));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized, including a top-level
/// `None`, which has no value form.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value
        .serialize(ValueSerializer::new())?
        .ok_or_else(|| Error::unsupported_type("`None` has no value form"))
}

/// Interpret a [`Value`] as an instance of type `T`.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{from_value, tomlet};
///
/// let ports: Vec<u16> = from_value(tomlet!([80, 443])).unwrap();
/// assert_eq!(ports, vec![80, 443]);
/// ```
///
/// # Errors
///
/// Returns [`Error::TypeMismatch`] when the value's shape does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(Deserializer::new(value))
}

/// Serialize any `T: Serialize` to a writer in tomlet format.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(buffer, b"x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, EncoderOptions::default())
}

/// Serialize any `T: Serialize` to a writer in tomlet format with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(
    mut writer: W,
    value: &T,
    options: EncoderOptions,
) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of tomlet text.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid tomlet or cannot be deserialized to type `T`.
/// Parse errors include line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    debug!("decoding {} bytes", s.len());
    let value = parse(s)?;
    let result = from_value(value);
    debug!("decode finished, ok = {}", result.is_ok());
    result
}

/// Deserialize an instance of type `T` from an I/O stream of tomlet text.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_reader(Cursor::new(b"x = 1\ny = 2\n")).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid tomlet,
/// or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of tomlet text.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::from_slice;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_slice(b"x = 1\ny = 2\n").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid tomlet,
/// or cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Returns `true` when `value` equals its type's default.
///
/// Meant for `#[serde(skip_serializing_if = "serde_tomlet::is_empty")]`,
/// which leaves zero values (`""`, `0`, `false`, empty collections) out of
/// the encoded document.
///
/// # Examples
///
/// ```rust
/// assert!(serde_tomlet::is_empty(&String::new()));
/// assert!(serde_tomlet::is_empty(&0u32));
/// assert!(!serde_tomlet::is_empty(&Some(0)));
/// ```
#[must_use]
pub fn is_empty<T>(value: &T) -> bool
where
    T: Default + PartialEq,
{
    *value == T::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
    struct Scalars {
        title: String,
        count: i64,
        ratio: f64,
        flag: bool,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
    struct Tagged {
        #[serde(rename = "title")]
        name: String,
        #[serde(skip)]
        hidden: i32,
    }

    #[test]
    fn test_round_trip_scalars() {
        let original = Scalars {
            title: "hello world".to_string(),
            count: 42,
            ratio: 0.5,
            flag: true,
        };
        let text = to_string(&original).unwrap();
        let mut back = Scalars::default();
        decode(&text, &mut back).unwrap();
        assert_eq!(original, back);
    }

    #[test]
    fn test_decode_renamed_field() {
        let mut tagged = Tagged::default();
        decode("title = \"abc\"\n", &mut tagged).unwrap();
        assert_eq!(tagged.name, "abc");
    }

    #[test]
    fn test_skipped_field_is_not_written_and_decodes_to_default() {
        let mut tagged = Tagged::default();
        decode("title = \"x\"\nhidden = 1\n", &mut tagged).unwrap();
        assert_eq!(tagged.hidden, 0);

        tagged.hidden = 7;
        assert_eq!(to_string(&tagged).unwrap(), "title = \"x\"\n");
    }

    #[test]
    fn test_integer_field_truncates_floats() {
        #[derive(Deserialize)]
        struct Counter {
            count: i32,
        }
        let counter: Counter = from_str("count = 3\n").unwrap();
        assert_eq!(counter.count, 3);
        let counter: Counter = from_str("count = 3.5\n").unwrap();
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn test_bool_fields() {
        #[derive(Deserialize)]
        struct Flag {
            flag: bool,
        }
        assert!(from_str::<Flag>("flag = true\n").unwrap().flag);
        assert!(!from_str::<Flag>("flag = false\n").unwrap().flag);
    }

    #[test]
    fn test_integer_slice() {
        #[derive(Deserialize)]
        struct Arr {
            arr: Vec<i64>,
        }
        let arr: Arr = from_str("arr = [1, 2, 3]\n").unwrap();
        assert_eq!(arr.arr, vec![1, 2, 3]);
    }

    #[test]
    fn test_omitempty() {
        #[derive(Serialize)]
        struct WithOmit {
            #[serde(skip_serializing_if = "is_empty")]
            field: String,
        }
        #[derive(Serialize)]
        struct WithoutOmit {
            field: String,
        }
        assert_eq!(to_string(&WithOmit { field: String::new() }).unwrap(), "");
        assert_eq!(
            to_string(&WithoutOmit { field: String::new() }).unwrap(),
            "field = \"\"\n"
        );
    }

    #[test]
    fn test_missing_value_is_parse_error() {
        let mut target = Scalars::default();
        let err = decode("key = \n", &mut target).unwrap_err();
        assert!(err.is_parse());
        assert_eq!(target, Scalars::default());
    }

    #[test]
    fn test_decode_keeps_absent_fields() {
        let mut target = Scalars {
            title: "keep".to_string(),
            count: 1,
            ratio: 2.5,
            flag: true,
        };
        decode("count = 9\n", &mut target).unwrap();
        assert_eq!(target.title, "keep");
        assert_eq!(target.count, 9);
        assert_eq!(target.ratio, 2.5);
        assert!(target.flag);
    }

    #[test]
    fn test_decode_leaves_unmentioned_fields_byte_for_byte() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Job {
            count: i64,
            stamp: String,
            big: u64,
            wide: i128,
        }
        let mut job = Job {
            count: 1,
            stamp: "2024-01-15 10:30:00.5+00:00".to_string(),
            big: u64::MAX,
            wide: i128::MIN,
        };
        decode("count = 2
", &mut job).unwrap();
        assert_eq!(
            job,
            Job {
                count: 2,
                stamp: "2024-01-15 10:30:00.5+00:00".to_string(),
                big: u64::MAX,
                wide: i128::MIN,
            }
        );

        decode("big = 5
", &mut job).unwrap();
        assert_eq!(job.big, 5);
    }

    #[test]
    fn test_wide_integer_fails_to_encode() {
        #[derive(Serialize)]
        struct Big {
            big: u64,
        }
        let err = to_string(&Big { big: u64::MAX }).unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
        assert!(to_value(&Big { big: u64::MAX }).is_err());
    }

    #[test]
    fn test_decode_merges_nested_sections() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Db {
            host: String,
            port: u16,
        }
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct App {
            name: String,
            db: Db,
        }
        let mut app = App {
            name: "svc".to_string(),
            db: Db {
                host: "localhost".to_string(),
                port: 5432,
            },
        };
        decode("[db]\nport = 6543\n", &mut app).unwrap();
        assert_eq!(app.db.host, "localhost");
        assert_eq!(app.db.port, 6543);
        assert_eq!(app.name, "svc");
    }

    #[test]
    fn test_type_mismatch() {
        let err = from_str::<Scalars>("title = 5\n").unwrap_err();
        assert_eq!(err, Error::type_mismatch("string", "integer"));
    }

    #[test]
    fn test_timestamps() {
        #[derive(Serialize, Deserialize, Debug, PartialEq)]
        struct Event {
            at: DateTime<FixedOffset>,
        }
        let event: Event = from_str("at = 2024-01-15T10:30:00+02:00\n").unwrap();
        assert_eq!(event.at.to_rfc3339(), "2024-01-15T10:30:00+02:00");

        let text = to_string(&event).unwrap();
        assert_eq!(text, "at = 2024-01-15T10:30:00+02:00\n");
        assert_eq!(from_str::<Event>(&text).unwrap(), event);
    }

    #[test]
    fn test_maps() {
        #[derive(Deserialize)]
        struct Labels {
            labels: HashMap<String, i32>,
        }
        let labels: Labels = from_str("labels = { a = 1, b = 2 }\n").unwrap();
        assert_eq!(labels.labels.len(), 2);
        assert_eq!(labels.labels["b"], 2);
    }

    #[test]
    fn test_dynamic_value_field() {
        #[derive(Deserialize)]
        struct Plugin {
            settings: Value,
        }
        let plugin: Plugin = from_str("settings = { depth = 3, tags = [\"a\"] }\n").unwrap();
        assert_eq!(plugin.settings.get("depth"), Some(&Value::Integer(3)));
        assert!(matches!(plugin.settings, Value::InlineTable(_)));
    }

    #[test]
    fn test_dynamic_inline_table_is_written_back_inline() {
        #[derive(Serialize, Deserialize)]
        struct Plugin {
            name: String,
            settings: Value,
        }
        let text = "name = \"cache\"\nsettings = { depth = 3 }\n";
        let plugin: Plugin = from_str(text).unwrap();
        assert_eq!(to_string(&plugin).unwrap(), text);
    }

    #[test]
    fn test_encode_bytes() {
        let mut map = HashMap::new();
        map.insert("only", "one");
        assert_eq!(encode(&map).unwrap(), b"only = \"one\"\n".to_vec());
    }

    #[test]
    fn test_parse_returns_root_table() {
        assert!(matches!(parse("").unwrap(), Value::Table(map) if map.is_empty()));
    }

    #[test]
    fn test_to_value_none_is_an_error() {
        assert!(to_value(&Option::<i32>::None).is_err());
    }

    #[test]
    fn test_writer_and_reader() {
        let original = Scalars {
            title: "io".to_string(),
            count: 5,
            ratio: 1.25,
            flag: false,
        };
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &original).unwrap();
        let back: Scalars = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(original, back);
        let back: Scalars = from_slice(&buffer).unwrap();
        assert_eq!(original, back);
    }
}
