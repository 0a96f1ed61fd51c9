//! Business logic services.
//!
//! [`ImportService`] drives an import; [`remap`] holds the identity
//! remapping it applies to every setting.

pub mod import;
pub mod remap;

pub use import::{ImportOptions, ImportRequest, ImportResult, ImportService};
pub use remap::{
    IdentifierGenerator, IdentityMap, IdentityRemapper, IndexAllocator, RemapDelta, RemapOutcome,
    SequentialGenerator, UuidGenerator,
};
