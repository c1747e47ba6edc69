//! Tunisian postal codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Number of digits in a Tunisian postal code.
pub const POSTAL_CODE_LENGTH: usize = 4;

/// Errors that can occur when parsing a [`PostalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeError {
    #[error("postal code cannot be empty")]
    Empty,
    #[error("postal code must be exactly {POSTAL_CODE_LENGTH} digits")]
    Format,
}

/// Normalize raw keyboard input for the postal code field.
///
/// Strips every non-digit character, then keeps at most the first four digits.
/// Applied on every edit, so the stored draft only ever holds digits.
///
/// ```
/// use souk_core::sanitize_postal_code;
///
/// assert_eq!(sanitize_postal_code("10-00"), "1000");
/// assert_eq!(sanitize_postal_code("2080 Ariana"), "2080");
/// assert_eq!(sanitize_postal_code("123456"), "1234");
/// ```
#[must_use]
pub fn sanitize_postal_code(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_digit)
        .take(POSTAL_CODE_LENGTH)
        .collect()
}

/// A validated four digit postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostalCode(String);

impl PostalCode {
    /// Parse a postal code, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PostalCodeError::Empty`] for blank input and
    /// [`PostalCodeError::Format`] for anything that is not exactly four
    /// ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PostalCodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PostalCodeError::Empty);
        }
        if trimmed.len() != POSTAL_CODE_LENGTH || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PostalCodeError::Format);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostalCode {
    type Error = PostalCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PostalCode> for String {
    fn from(code: PostalCode) -> Self {
        code.0
    }
}
