//! The tomlet document format.
//!
//! This module only holds documentation. Every example below is compiled
//! and checked as a doctest.
//!
//! # Documents
//!
//! A document is a root table made of statements, one per line:
//!
//! ```text
//! document     ::= { statement }
//! statement    ::= header | key "=" value | NEWLINE
//! header       ::= "[" key { "." key } "]"
//! key          ::= bare-key | quoted-string
//! value        ::= string | number | timestamp | "true" | "false"
//!                | array | inline-table
//! array        ::= "[" [ value { "," value } [ "," ] ] "]"
//! inline-table ::= "{" [ key "=" value { "," key "=" value } [ "," ] ] "}"
//! ```
//!
//! `#` starts a comment that runs to the end of the line. Blank lines are
//! ignored.
//!
//! # Keys
//!
//! Bare keys start with a letter and continue with letters, digits, `_` or
//! `-`. Anything else, including keys starting with a digit and the words
//! `true` and `false`, must be quoted.
//!
//! ```rust
//! let doc = serde_tomlet::parse("max-conns = 10\n\"2nd place\" = \"bob\"\n").unwrap();
//! assert_eq!(doc.get("max-conns").and_then(|v| v.as_integer()), Some(10));
//! assert_eq!(doc.get("2nd place").and_then(|v| v.as_str()), Some("bob"));
//! ```
//!
//! A key that appears twice in the same table keeps the last value.
//!
//! # Tables
//!
//! A `[header]` opens a section table; every following key belongs to it
//! until the next header. Dotted headers address nested tables from the root
//! and create missing tables on the way.
//!
//! ```rust
//! use serde_tomlet::Value;
//!
//! let doc = serde_tomlet::parse("[a.b]\nx = 1\ny = 2\n[c]\nz = 3\n").unwrap();
//! let b = doc.get("a").and_then(|a| a.get("b")).unwrap();
//! assert_eq!(b.get("y"), Some(&Value::Integer(2)));
//! assert_eq!(doc.get("c").and_then(|c| c.get("z")), Some(&Value::Integer(3)));
//! ```
//!
//! A key that already holds a value cannot be reopened as a table:
//!
//! ```rust
//! let err = serde_tomlet::parse("a = 1\n[a.b]\n").unwrap_err();
//! assert!(err.to_string().contains("cannot use `a` as table"));
//! ```
//!
//! # Values
//!
//! | Kind | Example | Notes |
//! |------|---------|-------|
//! | String | `"text"` | escapes: `\\` `\"` `\n` `\r` `\t` |
//! | Bare string | `local` | an identifier in value position |
//! | Integer | `42` | 64-bit signed |
//! | Float | `3.14`, `6.02e23` | contains `.`, `e` or `E` |
//! | Boolean | `true`, `false` | |
//! | Timestamp | `2024-01-15T10:30:00Z` | RFC 3339, bare or quoted |
//! | Array | `[1, 2, 3]` | may span lines, trailing `,` allowed |
//! | Inline table | `{ x = 1, y = 2 }` | may span lines, trailing `,` allowed |
//!
//! Quoted strings that hold an RFC 3339 timestamp are read as timestamps.
//! A timestamp remembers the text it was written with, so decoding it into a
//! `String` field gives that text back unchanged.
//!
//! ```rust
//! use serde_tomlet::Value;
//!
//! let doc = serde_tomlet::parse(
//!     "when = \"2024-01-15T10:30:00Z\"\nhosts = [\n  \"a\",\n  \"b\",\n]\n",
//! );
//! let doc = doc.unwrap();
//! assert!(doc.get("when").unwrap().is_datetime());
//! assert_eq!(doc.get("hosts").and_then(Value::as_array).map(Vec::len), Some(2));
//! ```
//!
//! ## Negative numbers
//!
//! A leading `-` is read as a date separator, so `-5` is scanned as a
//! timestamp and rejected. Negative numbers cannot be written as bare
//! values; the behaviour is kept for compatibility with existing files.
//!
//! ```rust
//! let err = serde_tomlet::parse("offset = -5\n").unwrap_err();
//! assert!(err.to_string().contains("malformed timestamp"));
//! ```
//!
//! ## Backslashes
//!
//! Inside a quoted string, a `"` directly after a `\` never closes the
//! string. A string whose content ends with a backslash therefore cannot be
//! written. A string that is never closed is an error:
//!
//! ```rust
//! let err = serde_tomlet::parse("a = 1\n\"b = 2\n").unwrap_err();
//! assert!(err.to_string().contains("unterminated string"));
//! ```
//!
//! # Encoding
//!
//! The encoder writes `key = value` lines, then one section per nested
//! struct, headed by its full dotted path. Maps and structs inside arrays
//! or inline tables are written as inline tables.
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Tls { enabled: bool }
//!
//! #[derive(Serialize)]
//! struct Http { port: u16, tls: Tls }
//!
//! #[derive(Serialize)]
//! struct Server { host: String, http: Http }
//!
//! let server = Server {
//!     host: "0.0.0.0".into(),
//!     http: Http { port: 8080, tls: Tls { enabled: true } },
//! };
//! assert_eq!(
//!     serde_tomlet::to_string(&server).unwrap(),
//!     "host = \"0.0.0.0\"\n\n[http]\nport = 8080\n\n[http.tls]\nenabled = true\n"
//! );
//! ```
