//! Storage layer abstraction.
//!
//! Imports write through the [`SettingsStore`] trait. [`MemorySettingsStore`]
//! is an in-process implementation used by tests and by callers that persist
//! the resulting map themselves.

pub mod memory;
pub mod traits;

pub use memory::MemorySettingsStore;
pub use traits::SettingsStore;
