//! Property-based tests for the codec, key grammar, and account numbering.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Field encoding round-trips in both directions
//! - Key parsing renders back to the original key
//! - Allocated account numbers are unique and avoid existing ones
//! - Malformed lines never change the imported count

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;
use secrecy::SecretString;
use settings_import::io::encode_record;
use settings_import::services::{IndexAllocator, SequentialGenerator};
use settings_import::{
    FieldCodec, ImportConfig, ImportRequest, ImportService, KdfParams, MemorySettingsStore,
    StructuredKey,
};

// Low cost for fast tests.
const FAST: KdfParams = KdfParams::new(64, 1, 1);

fn codec() -> FieldCodec {
    FieldCodec::with_params(&SecretString::from("property passphrase".to_string()), &FAST).unwrap()
}

proptest! {
    /// Property: decode(encode(x)) == x for printable strings.
    #[test]
    fn prop_decode_inverts_encode(s in "\\PC{0,200}") {
        let codec = codec();
        let token = codec.encode(&s).unwrap();
        prop_assert_eq!(codec.decode(&token).unwrap(), s);
    }

    /// Property: encode(decode(t)) == t for every token decode accepts.
    #[test]
    fn prop_encode_inverts_decode(s in "\\PC{0,200}") {
        let codec = codec();
        let token = codec.encode(&s).unwrap();
        let plain = codec.decode(&token).unwrap();
        prop_assert_eq!(codec.encode(&plain).unwrap(), token);
    }

    /// Property: tokens never contain the default separator.
    #[test]
    fn prop_tokens_avoid_separator(s in "\\PC{0,100}") {
        let token = codec().encode(&s).unwrap();
        prop_assert!(!token.contains(':'));
        prop_assert!(!token.contains('\n'));
    }

    /// Property: parsing then rendering a key is the identity.
    #[test]
    fn prop_key_parse_display_roundtrips(key in "[a-zA-Z0-9.]{0,60}") {
        let parsed = StructuredKey::parse(&key);
        prop_assert!(!parsed.segments().is_empty());
        prop_assert_eq!(parsed.to_string(), key);
    }

    /// Property: allocated numbers are distinct and never collide with existing ones.
    #[test]
    fn prop_allocations_are_unique(
        existing in prop::collection::btree_set(0u32..64, 0..32),
        count in 1usize..40
    ) {
        let mut allocator = IndexAllocator::new(existing.iter().copied());
        let allocated: Vec<u32> = (0..count).map(|_| allocator.allocate().unwrap()).collect();

        let unique: BTreeSet<u32> = allocated.iter().copied().collect();
        prop_assert_eq!(unique.len(), allocated.len());
        prop_assert!(unique.is_disjoint(&existing));

        // Lowest-free: every number below the largest allocation is in use.
        let max = *allocated.iter().max().unwrap();
        for n in 0..max {
            prop_assert!(existing.contains(&n) || unique.contains(&n));
        }
    }

    /// Property: malformed lines interleaved anywhere never change the count.
    #[test]
    fn prop_malformed_lines_ignored(
        groups in 1usize..6,
        noise in prop::collection::vec("[a-zA-Z0-9 ]{0,20}", 0..10)
    ) {
        let codec = codec();
        let mut lines = Vec::new();
        for g in 0..groups {
            lines.push(encode_record(&codec, &format!("g{g}.accountNumber"), "0", ':').unwrap());
            lines.push(encode_record(&codec, &format!("g{g}.name"), "n", ':').unwrap());
        }
        for (i, junk) in noise.iter().enumerate() {
            let at = (i * 3) % (lines.len() + 1);
            lines.insert(at, junk.clone());
        }
        let data = lines.join("\n");

        let secret = SecretString::from("property passphrase".to_string());
        let mut store = MemorySettingsStore::new();
        let result = ImportService::new(ImportConfig::default().with_kdf(FAST))
            .with_generator(Arc::new(SequentialGenerator::new("p")))
            .import(ImportRequest::new(&data, &secret), &mut store)
            .unwrap();

        prop_assert_eq!(result.settings_imported, groups * 2);
        prop_assert_eq!(result.groups_created, groups);
        let expected: Vec<u32> = (0..u32::try_from(groups).unwrap()).collect();
        prop_assert_eq!(result.allocated_account_numbers, expected);
    }
}
