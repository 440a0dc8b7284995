//! RFC 3339 timestamps that remember how they were written.
//!
//! RFC 3339 allows several spellings of one instant (`Z` or `+00:00`, `T` or
//! a space, any number of fraction digits). [`Datetime`] keeps the text it
//! was parsed from next to the parsed value, so a timestamp read into a
//! `String` field comes back exactly as it was written.
//!
//! ```rust
//! use serde_tomlet::Datetime;
//!
//! let dt: Datetime = "2024-01-15 10:30:00.5+00:00".parse().unwrap();
//! assert_eq!(dt.as_str(), "2024-01-15 10:30:00.5+00:00");
//! assert_eq!(dt.value().timestamp(), 1_705_314_600);
//! ```

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

/// A parsed timestamp together with its source text.
///
/// Equality compares the instant only, the same way `chrono` compares
/// `DateTime` values; two spellings of one instant are equal.
#[derive(Clone, Debug)]
pub struct Datetime {
    value: DateTime<FixedOffset>,
    text: String,
}

impl Datetime {
    /// Parses `text` as an RFC 3339 timestamp, keeping `text` as written.
    ///
    /// # Errors
    ///
    /// Returns chrono's parse error when `text` is not RFC 3339.
    pub fn parse(text: &str) -> Result<Self, chrono::ParseError> {
        let value = DateTime::parse_from_rfc3339(text)?;
        Ok(Datetime {
            value,
            text: text.to_string(),
        })
    }

    #[must_use]
    pub fn value(&self) -> &DateTime<FixedOffset> {
        &self.value
    }

    /// The text the timestamp was read from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }

    /// Whether the text can be written without quotes: the lexer reads an
    /// unquoted timestamp as one run of digits and `.+eETZ-:`.
    pub(crate) fn is_bare(&self) -> bool {
        self.text.starts_with(|c: char| c.is_ascii_digit())
            && self
                .text
                .chars()
                .all(|c| c.is_ascii_digit() || ".+eETZ-:".contains(c))
    }
}

impl PartialEq for Datetime {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Datetime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Datetime::parse(s)
    }
}

impl From<DateTime<FixedOffset>> for Datetime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        let text = value.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        Datetime { value, text }
    }
}

impl From<DateTime<Utc>> for Datetime {
    fn from(value: DateTime<Utc>) -> Self {
        Datetime::from(DateTime::<FixedOffset>::from(value))
    }
}
