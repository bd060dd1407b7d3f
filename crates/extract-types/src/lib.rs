//! Shared value types for the extraction pipeline.
//!
//! - [`Identifier`]: a non-empty resource id, the only key used for cross-document joins
//! - [`FieldValue`]: a decoded field that is either present or explicitly missing

use std::borrow::Borrow;

/// Literal written wherever a field is absent.
pub const MISSING_MARKER: &str = "N/A";

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A resource identifier that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction, so a record
/// can never be keyed under an empty or whitespace-only id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new `Identifier` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets maps keyed by `Identifier` be queried with a plain `&str`.
impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A decoded field value.
///
/// Absence is a value, not an error: clinical documents routinely omit optional fields, and
/// every consumer renders [`FieldValue::Missing`] as [`MISSING_MARKER`]. An empty attribute is
/// `Present("")` and stays distinguishable from a missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Present(String),
    #[default]
    Missing,
}

impl FieldValue {
    pub fn present(value: impl Into<String>) -> Self {
        Self::Present(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn is_present(&self) -> bool {
        !self.is_missing()
    }

    /// Returns the value, or `None` when missing.
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Present(value) => Some(value),
            Self::Missing => None,
        }
    }

    /// Returns the value, or [`MISSING_MARKER`] when missing.
    pub fn as_str(&self) -> &str {
        self.as_deref().unwrap_or(MISSING_MARKER)
    }

    /// Transforms a present value; a missing value stays missing.
    pub fn map(self, f: impl FnOnce(&str) -> String) -> FieldValue {
        match self {
            Self::Present(value) => Self::Present(f(&value)),
            Self::Missing => Self::Missing,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Present)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
