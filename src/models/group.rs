//! Group (account) identifiers and the destination's group registry.
//!
//! Settings belonging to one account share a group identifier as the first
//! segment of their keys. The destination keeps an ordered, comma-joined list
//! of every known identifier under a single registry key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator used when serializing the registry.
const REGISTRY_SEPARATOR: char = ',';

/// Unique identifier for a group of settings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Creates a new group ID from the given string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random group ID using UUID v4.
    ///
    /// Uses the hyphenated form so generated IDs match the identifiers the
    /// destination already stores.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ordered list of known group identifiers.
///
/// Append-only: existing entries keep their position and are never
/// deduplicated, so a registry read from the destination serializes back to
/// the same prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRegistry {
    entries: Vec<String>,
}

impl GroupRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parses a stored registry value.
    ///
    /// A missing or empty value yields an empty registry.
    #[must_use]
    pub fn parse(stored: Option<&str>) -> Self {
        let entries = match stored {
            Some(s) if !s.is_empty() => s.split(REGISTRY_SEPARATOR).map(str::to_string).collect(),
            _ => Vec::new(),
        };
        Self { entries }
    }

    /// Appends a group identifier.
    pub fn push(&mut self, id: &GroupId) {
        self.entries.push(id.as_str().to_string());
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the registry for storage.
    #[must_use]
    pub fn to_stored(&self) -> String {
        self.entries.join(&REGISTRY_SEPARATOR.to_string())
    }
}

impl fmt::Display for GroupRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}
