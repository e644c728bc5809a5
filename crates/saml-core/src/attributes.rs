//! Identity provider attributes and the attribute mapping configuration.

use std::collections::HashMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Attributes asserted by an identity provider.
///
/// SAML attributes are multi-valued, so every name maps to an ordered
/// sequence of values. An empty sequence means the attribute was asserted
/// without a value.
pub type AttributeMap = HashMap<String, Vec<String>>;

/// Connects identity provider attribute names to user record targets.
///
/// Each entry names an IdP attribute and a non-empty, ordered list of target
/// specifiers. A specifier names either a data field or a callable hook of the
/// user model. Entries keep their declaration order; the synchronizer walks
/// them in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMapping {
    entries: Vec<(String, Vec<String>)>,
}

impl AttributeMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an entry, builder style.
    #[must_use]
    pub fn with<I, T>(mut self, idp_attribute: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.insert(idp_attribute, targets);
        self
    }

    /// Inserts an entry.
    ///
    /// Replacing an existing IdP attribute keeps its original position.
    pub fn insert<I, T>(&mut self, idp_attribute: impl Into<String>, targets: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let idp_attribute = idp_attribute.into();
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();

        match self.entries.iter_mut().find(|(name, _)| *name == idp_attribute) {
            Some(entry) => entry.1 = targets,
            None => self.entries.push((idp_attribute, targets)),
        }
    }

    /// Gets the targets mapped from an IdP attribute.
    #[must_use]
    pub fn get(&self, idp_attribute: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == idp_attribute)
            .map(|(_, targets)| targets.as_slice())
    }

    /// Iterates over entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, targets)| (name.as_str(), targets.as_slice()))
    }

    /// Iterates over the IdP attributes that feed a given target.
    pub fn sources_of<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, targets)| targets.iter().any(|t| t == target))
            .map(|(name, _)| name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the mapping has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AttributeMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, targets) in &self.entries {
            map.serialize_entry(name, targets)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AttributeMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = AttributeMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of IdP attribute names to lists of user fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut mapping = AttributeMapping::new();
                while let Some((name, targets)) = access.next_entry::<String, Vec<String>>()? {
                    if targets.is_empty() {
                        return Err(serde::de::Error::custom(format!(
                            "attribute mapping for '{name}' must name at least one field"
                        )));
                    }
                    mapping.insert(name, targets);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}
