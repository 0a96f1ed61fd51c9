//! Settings store trait.

use crate::Result;

/// Destination key-value store for imported settings.
///
/// The store is the authoritative home of settings; batching and atomicity of
/// the writes issued by one import are the implementation's concern.
pub trait SettingsStore {
    /// Retrieves a setting by key.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a setting, replacing any previous value.
    ///
    /// Implementations report rejected writes as
    /// [`crate::Error::StoreWrite`].
    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    /// Lists the account numbers already in use.
    ///
    /// `index_field` is the terminal key segment holding account numbers.
    /// Stores that cannot enumerate their keys return an empty list and rely
    /// on callers to supply the numbers explicitly.
    fn account_numbers(&self, index_field: &str) -> Result<Vec<u32>> {
        let _ = index_field;
        Ok(Vec::new())
    }
}
