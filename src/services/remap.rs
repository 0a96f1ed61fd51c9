//! Identity remapping for imported settings.
//!
//! Imported group identifiers are never reused. Each old identifier maps to
//! one freshly generated identifier for the lifetime of a single import, so
//! every field of an account lands in the same new account, and importing a
//! file twice yields two unrelated accounts.
//!
//! Account numbers are a small shared namespace. [`IndexAllocator`] hands
//! out the lowest number not already taken by the destination or by this
//! import.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::models::{GroupId, StructuredKey};
use crate::{Error, Result};

/// Source of new group identifiers.
pub trait IdentifierGenerator: Send + Sync {
    /// Generates a new, globally unique identifier.
    fn generate(&self) -> GroupId;
}

/// Generates random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdentifierGenerator for UuidGenerator {
    fn generate(&self) -> GroupId {
        GroupId::generate()
    }
}

/// Generates `<prefix>-<n>` identifiers, counting from 1.
///
/// Deterministic; intended for tests and reproducible fixtures.
#[derive(Debug)]
pub struct SequentialGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialGenerator {
    /// Creates a generator with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdentifierGenerator for SequentialGenerator {
    fn generate(&self) -> GroupId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        GroupId::new(format!("{}-{n}", self.prefix))
    }
}

/// Old group identifier to new group identifier, for one import.
#[derive(Debug, Default)]
pub struct IdentityMap {
    mapping: HashMap<String, GroupId>,
}

impl IdentityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the new identifier for `old`, generating one on first sight.
    ///
    /// The flag is true only when the mapping was created by this call.
    pub fn resolve(&mut self, old: &str, generator: &dyn IdentifierGenerator) -> (GroupId, bool) {
        if let Some(existing) = self.mapping.get(old) {
            return (existing.clone(), false);
        }
        let new_id = generator.generate();
        tracing::info!(old_group = old, new_group = %new_id, "Mapping group identifier");
        self.mapping.insert(old.to_string(), new_id.clone());
        (new_id, true)
    }

    /// Number of distinct old identifiers seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    /// Returns true if nothing has been mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Allocator for account numbers.
#[derive(Debug, Clone)]
pub struct IndexAllocator {
    taken: BTreeSet<u32>,
    allocated: Vec<u32>,
    ceiling: u32,
}

impl Default for IndexAllocator {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl IndexAllocator {
    /// Creates an allocator seeded with the destination's numbers.
    #[must_use]
    pub fn new(existing: impl IntoIterator<Item = u32>) -> Self {
        Self {
            taken: existing.into_iter().collect(),
            allocated: Vec::new(),
            ceiling: u32::MAX,
        }
    }

    /// Caps the highest number that may be allocated.
    #[must_use]
    pub const fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Allocates the lowest free number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationExhausted`] if every `u32` is taken.
    pub fn allocate(&mut self) -> Result<u32> {
        let mut candidate: u32 = 0;
        for &n in &self.taken {
            if n > candidate {
                break;
            }
            candidate = n.checked_add(1).ok_or(Error::AllocationExhausted)?;
        }
        if candidate > self.ceiling {
            return Err(Error::AllocationExhausted);
        }
        self.taken.insert(candidate);
        self.allocated.push(candidate);
        Ok(candidate)
    }

    /// Numbers allocated by this allocator, in allocation order.
    #[must_use]
    pub fn allocated(&self) -> &[u32] {
        &self.allocated
    }
}

/// Result of remapping one setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapOutcome {
    /// Rewritten key.
    pub key: StructuredKey,
    /// Possibly rewritten value.
    pub value: String,
    /// True the first time this old group identifier is seen.
    pub group_created: bool,
    /// Set when this field registered a new account.
    pub account_number: Option<u32>,
}

/// Changes produced by one import that the caller must persist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemapDelta {
    /// New group identifiers to append to the registry, in order.
    pub registered: Vec<GroupId>,
    /// Account numbers allocated, in order.
    pub allocated: Vec<u32>,
}

/// Rewrites group identifiers and account numbers for one import.
pub struct IdentityRemapper<'a> {
    generator: &'a dyn IdentifierGenerator,
    index_field: &'a str,
    identities: IdentityMap,
    allocator: IndexAllocator,
    numbered: HashMap<GroupId, u32>,
    registered: Vec<GroupId>,
}

impl<'a> IdentityRemapper<'a> {
    /// Creates a remapper.
    ///
    /// `index_field` is the terminal key segment that carries the account
    /// number.
    #[must_use]
    pub fn new(
        generator: &'a dyn IdentifierGenerator,
        index_field: &'a str,
        allocator: IndexAllocator,
    ) -> Self {
        Self {
            generator,
            index_field,
            identities: IdentityMap::new(),
            allocator,
            numbered: HashMap::new(),
            registered: Vec::new(),
        }
    }

    /// Remaps one setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationExhausted`] if no account number is free.
    pub fn remap(&mut self, key: StructuredKey, value: String) -> Result<RemapOutcome> {
        let Some(old_group) = key.group_segment() else {
            return Ok(RemapOutcome {
                key,
                value,
                group_created: false,
                account_number: None,
            });
        };

        let (new_group, group_created) = self.identities.resolve(old_group, self.generator);
        let is_index = key.last_segment() == self.index_field;
        let key = key.with_group(&new_group);

        if !is_index {
            return Ok(RemapOutcome {
                key,
                value,
                group_created,
                account_number: None,
            });
        }

        // A duplicated index field keeps the group's first number.
        if let Some(&number) = self.numbered.get(&new_group) {
            return Ok(RemapOutcome {
                key,
                value: number.to_string(),
                group_created,
                account_number: None,
            });
        }

        let number = self.allocator.allocate()?;
        self.numbered.insert(new_group.clone(), number);
        self.registered.push(new_group);

        Ok(RemapOutcome {
            key,
            value: number.to_string(),
            group_created,
            account_number: Some(number),
        })
    }

    /// Consumes the remapper, returning what must be persisted.
    #[must_use]
    pub fn into_delta(self) -> RemapDelta {
        tracing::debug!(
            groups_seen = self.identities.len(),
            registered = self.registered.len(),
            "Remapping complete"
        );
        RemapDelta {
            registered: self.registered,
            allocated: self.allocator.allocated,
        }
    }
}
