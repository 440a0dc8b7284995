//! Configuration options for the tomlet encoder.
//!
//! [`EncoderOptions`] controls two things:
//!
//! - the **priority list**: field names that are written first, in list
//!   order, before the remaining `name = value` lines of a table
//! - **inline spacing**: whether inline tables are padded, `{ a = 1 }`
//!   versus `{a = 1}`
//!
//! ## Examples
//!
//! ```rust
//! use serde_tomlet::{to_string_with_options, EncoderOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Job { retries: u32, name: String }
//!
//! let job = Job { retries: 3, name: "nightly".to_string() };
//!
//! let options = EncoderOptions::new().with_priority(["name"]);
//! let text = to_string_with_options(&job, options).unwrap();
//! assert_eq!(text, "name = \"nightly\"\nretries = 3\n");
//! ```

/// Field names written ahead of all others by default.
pub const DEFAULT_PRIORITY: &[&str] = &[
    "string_field",
    "integer",
    "int_field",
    "float",
    "float_field",
    "boolean",
    "bool_field",
    "array",
    "slice_field",
    "map_field",
    "string",
    "nested",
    "nested_struct",
    "time_field",
    "interface_field",
];

/// Configuration options for tomlet encoding.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::EncoderOptions;
///
/// // Default options: built-in priority list, padded inline tables
/// let options = EncoderOptions::new();
/// assert!(options.inline_spacing);
///
/// // Plain field order, compact inline tables
/// let options = EncoderOptions::new()
///     .without_priority()
///     .with_inline_spacing(false);
/// assert!(options.priority.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderOptions {
    /// Names of fields emitted first within each table, in this order.
    pub priority: Vec<String>,
    /// Pad inline tables with a space inside the braces.
    pub inline_spacing: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            priority: DEFAULT_PRIORITY.iter().map(|s| s.to_string()).collect(),
            inline_spacing: true,
        }
    }
}

impl EncoderOptions {
    /// Creates default options (built-in priority list, padded inline tables).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the priority list.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_tomlet::EncoderOptions;
    ///
    /// let options = EncoderOptions::new().with_priority(["id", "name"]);
    /// assert_eq!(options.priority, vec!["id", "name"]);
    /// ```
    #[must_use]
    pub fn with_priority<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority = names.into_iter().map(Into::into).collect();
        self
    }

    /// Clears the priority list so fields are written in declaration order.
    #[must_use]
    pub fn without_priority(mut self) -> Self {
        self.priority.clear();
        self
    }

    /// Sets whether inline tables are written as `{ a = 1 }` (the default)
    /// or `{a = 1}`.
    #[must_use]
    pub fn with_inline_spacing(mut self, spacing: bool) -> Self {
        self.inline_spacing = spacing;
        self
    }
}
