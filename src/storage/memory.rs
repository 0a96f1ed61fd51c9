//! In-memory settings store.

use std::collections::BTreeMap;

use super::SettingsStore;
use crate::models::StructuredKey;
use crate::{Error, Result};

/// Settings store backed by an ordered map.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    entries: BTreeMap<String, String>,
    read_only: bool,
}

impl MemorySettingsStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            read_only: false,
        }
    }

    /// Makes every subsequent write fail with [`Error::StoreWrite`].
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Returns all entries in key order.
    #[must_use]
    pub const fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }

    /// Number of stored settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::StoreWrite {
                key: key.to_string(),
                cause: "store is read-only".to_string(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn account_numbers(&self, index_field: &str) -> Result<Vec<u32>> {
        let numbers = self
            .entries
            .iter()
            .filter(|(key, _)| StructuredKey::parse(key).is_group_field(index_field))
            .filter_map(|(key, value)| match value.trim().parse::<u32>() {
                Ok(n) => Some(n),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Ignoring unparseable account number");
                    None
                },
            })
            .collect();
        Ok(numbers)
    }
}
