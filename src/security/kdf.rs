//! Argon2id key derivation for the field codec.
//!
//! Exports carry no salt, so derivation uses a fixed application salt. The
//! salt separates this crate's keys from any other Argon2id use of the same
//! passphrase; the cost parameters slow down guessing.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::{Error, Result};

/// Fixed application salt.
const APP_SALT: &[u8] = b"settings-import/field-codec/v1";

/// Length of each derived subkey.
pub const SUBKEY_LEN: usize = 32;

/// Cipher key followed by nonce key.
const DERIVED_LEN: usize = 2 * SUBKEY_LEN;

/// Argon2id cost parameters.
///
/// Encoder and decoder must agree on these; a token produced under other
/// parameters fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::new(19 * 1024, 3, 1)
    }
}

impl KdfParams {
    /// Creates a parameter set.
    #[must_use]
    pub const fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    /// Checks the parameters against Argon2's limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if Argon2 rejects the parameters.
    pub fn validate(&self) -> Result<()> {
        self.argon2_params()
            .map(|_| ())
            .map_err(|e| Error::InvalidInput(format!("invalid KDF parameters: {e}")))
    }

    fn argon2_params(&self) -> std::result::Result<Params, argon2::Error> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(DERIVED_LEN),
        )
    }
}

/// Keys derived from one passphrase.
pub struct DerivedKeys {
    material: Zeroizing<[u8; DERIVED_LEN]>,
}

impl DerivedKeys {
    /// AES-256-GCM key.
    #[must_use]
    pub fn cipher_key(&self) -> &[u8] {
        &self.material[..SUBKEY_LEN]
    }

    /// HMAC key for synthetic nonces.
    #[must_use]
    pub fn nonce_key(&self) -> &[u8] {
        &self.material[SUBKEY_LEN..]
    }
}

/// Derives the cipher and nonce keys from a passphrase using Argon2id.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for unusable parameters, or
/// [`Error::OperationFailed`] if derivation fails.
pub fn derive_keys(passphrase: &[u8], params: &KdfParams) -> Result<DerivedKeys> {
    let argon2_params = params
        .argon2_params()
        .map_err(|e| Error::InvalidInput(format!("invalid KDF parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut material = Zeroizing::new([0u8; DERIVED_LEN]);
    argon2
        .hash_password_into(passphrase, APP_SALT, material.as_mut())
        .map_err(|e| Error::OperationFailed {
            operation: "derive_keys".to_string(),
            cause: format!("Argon2id key derivation failed: {e}"),
        })?;

    Ok(DerivedKeys { material })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost for fast tests.
    const FAST: KdfParams = KdfParams::new(64, 1, 1);

    #[test]
    fn test_derivation_is_deterministic() {
        let a = derive_keys(b"passphrase", &FAST).unwrap();
        let b = derive_keys(b"passphrase", &FAST).unwrap();
        assert_eq!(a.cipher_key(), b.cipher_key());
        assert_eq!(a.nonce_key(), b.nonce_key());
    }

    #[test]
    fn test_subkeys_are_distinct() {
        let keys = derive_keys(b"passphrase", &FAST).unwrap();
        assert_eq!(keys.cipher_key().len(), SUBKEY_LEN);
        assert_eq!(keys.nonce_key().len(), SUBKEY_LEN);
        assert_ne!(keys.cipher_key(), keys.nonce_key());
    }

    #[test]
    fn test_passphrase_and_params_change_keys() {
        let base = derive_keys(b"passphrase", &FAST).unwrap();
        let other_pass = derive_keys(b"passphrase2", &FAST).unwrap();
        let other_cost = derive_keys(b"passphrase", &KdfParams::new(64, 2, 1)).unwrap();
        assert_ne!(base.cipher_key(), other_pass.cipher_key());
        assert_ne!(base.cipher_key(), other_cost.cipher_key());
    }

    #[test]
    fn test_key_is_not_plain_sha256() {
        use sha2::{Digest, Sha256};
        let keys = derive_keys(b"passphrase", &FAST).unwrap();
        let digest = Sha256::digest(b"passphrase");
        assert_ne!(keys.cipher_key(), digest.as_slice());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = KdfParams::new(1, 1, 1);
        assert!(matches!(bad.validate(), Err(Error::InvalidInput(_))));
        assert!(matches!(
            derive_keys(b"p", &bad),
            Err(Error::InvalidInput(_))
        ));
        assert!(KdfParams::default().validate().is_ok());
    }
}
