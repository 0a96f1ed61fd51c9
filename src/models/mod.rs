//! Data models for settings import.

pub mod group;
mod key;

pub use group::{GroupId, GroupRegistry};
pub use key::{SEGMENT_SEPARATOR, StructuredKey};
