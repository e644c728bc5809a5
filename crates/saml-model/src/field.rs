//! Typed user record fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The storage type of a user model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text.
    Text,
    /// `true` / `false`.
    Boolean,
    /// Signed 64-bit integer.
    Integer,
}

impl FieldKind {
    /// Returns the value a freshly instantiated record holds for this kind.
    #[must_use]
    pub fn default_value(self) -> FieldValue {
        match self {
            Self::Text => FieldValue::Text(String::new()),
            Self::Boolean => FieldValue::Boolean(false),
            Self::Integer => FieldValue::Integer(0),
        }
    }

    /// Converts a raw attribute value into a value of this kind.
    ///
    /// ## Errors
    ///
    /// Returns [`InvalidFieldValue`] if the raw value cannot be represented.
    pub fn convert(self, raw: &str) -> Result<FieldValue, InvalidFieldValue> {
        match self {
            Self::Text => Ok(FieldValue::Text(raw.to_string())),
            Self::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(FieldValue::Boolean(true)),
                "false" | "0" => Ok(FieldValue::Boolean(false)),
                _ => Err(InvalidFieldValue::new(self, raw)),
            },
            Self::Integer => raw
                .trim()
                .parse()
                .map(FieldValue::Integer)
                .map_err(|_| InvalidFieldValue::new(self, raw)),
        }
    }
}

/// A value held by a user record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Text value.
    Text(String),
}

impl FieldValue {
    /// Gets the text, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the boolean, if this is a boolean value.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// A field declared by a user model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name.
    pub name: String,
    /// Storage type.
    pub kind: FieldKind,
    /// Value of a freshly instantiated record.
    pub default: FieldValue,
}

impl FieldDef {
    /// Creates a field holding the kind's default value.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: kind.default_value(),
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<FieldValue>) -> Self {
        self.default = default.into();
        self
    }
}

/// A raw attribute value could not be converted to a field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{raw}' to a {kind:?} value")]
pub struct InvalidFieldValue {
    /// Target kind.
    pub kind: FieldKind,
    /// Raw value.
    pub raw: String,
}

impl InvalidFieldValue {
    fn new(kind: FieldKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_booleans_leniently() {
        assert_eq!(FieldKind::Boolean.convert("TRUE"), Ok(FieldValue::Boolean(true)));
        assert_eq!(FieldKind::Boolean.convert("0"), Ok(FieldValue::Boolean(false)));
        assert!(FieldKind::Boolean.convert("staff").is_err());
    }

    #[test]
    fn converts_integers() {
        assert_eq!(FieldKind::Integer.convert(" 42 "), Ok(FieldValue::Integer(42)));

        let err = FieldKind::Integer.convert("forty-two").unwrap_err();
        assert_eq!(err.raw, "forty-two");
        assert_eq!(err.kind, FieldKind::Integer);
    }

    #[test]
    fn text_is_taken_verbatim() {
        assert_eq!(FieldKind::Text.convert(" John "), Ok(FieldValue::from(" John ")));
    }

    #[test]
    fn display_matches_lookup_rendering() {
        assert_eq!(FieldValue::from(true).to_string(), "true");
        assert_eq!(FieldValue::from(7_i64).to_string(), "7");
        assert_eq!(FieldValue::from("john").to_string(), "john");
    }

    #[test]
    fn defaults_follow_kind() {
        let field = FieldDef::new("is_active", FieldKind::Boolean).with_default(true);
        assert_eq!(field.default, FieldValue::Boolean(true));
        assert_eq!(FieldDef::new("age", FieldKind::Text).default, FieldValue::from(""));
    }
}
