//! Error types for tomlet serialization and deserialization.
//!
//! ## Error Categories
//!
//! - **Parse errors**: invalid document syntax, with line/column information.
//!   Unexpected tokens, unterminated strings and table paths, table/value
//!   conflicts and malformed timestamps all land here.
//! - **Type mismatches**: a parsed value cannot populate the target type
//! - **Unsupported types**: the Rust shape has no tomlet representation
//! - **I/O errors**: reader/writer failures
//!
//! The lexer never fails on its own: unrecognized or unterminated input ends
//! the token stream, and the parser reports why it ended.
//!
//! ## Examples
//!
//! ```rust
//! use serde_tomlet::{parse, Error};
//!
//! let result = parse("key = \n");
//! assert!(matches!(result, Err(Error::Parse { .. })));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur during tomlet serialization/deserialization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The document is not valid tomlet
    #[error("Parse error at line {line}, column {col}: {msg}")]
    Parse { line: usize, col: usize, msg: String },

    /// A parsed value does not fit the target type
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// The Rust type has no tomlet representation
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a parse error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::Error;
    ///
    /// let err = Error::parse(10, 5, "unexpected token");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn parse(line: usize, col: usize, msg: impl Into<String>) -> Self {
        Error::Parse {
            line,
            col,
            msg: msg.into(),
        }
    }

    /// Creates a type mismatch error naming both the expected and the actual shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::Error;
    ///
    /// let err = Error::type_mismatch("integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error for shapes that cannot be mapped.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` if this error came from the lexer/parser stage.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn invalid_type(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        Error::TypeMismatch {
            expected: exp.to_string(),
            found: unexp.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
