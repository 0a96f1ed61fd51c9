//! Storage backend traits.

mod settings;

pub use settings::SettingsStore;
