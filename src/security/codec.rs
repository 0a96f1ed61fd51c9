//! Per-field symmetric codec for settings exports.
//!
//! Every key and every value in an export is encrypted on its own, so a
//! single line can be decoded without context from its neighbours.
//!
//! # Security Properties
//!
//! - **Algorithm**: AES-256-GCM (CTR keystream plus authentication tag)
//! - **Key**: Argon2id over the passphrase with a fixed application salt,
//!   split into a cipher key and a nonce key
//! - **Nonce**: synthetic, the first 12 bytes of HMAC-SHA256 over the plaintext
//! - **Format**: URL-safe base64 (no padding) of nonce + ciphertext + tag
//!
//! The synthetic nonce makes encoding deterministic: the same field always
//! encodes to the same token under the same passphrase, and `decode` only
//! accepts tokens that `encode` could have produced.
//!
//! The token alphabet is `[A-Za-z0-9_-]`, so tokens never contain the
//! line's field separator.
//!
//! # Example
//!
//! ```rust,ignore
//! use settings_import::security::FieldCodec;
//! use secrecy::SecretString;
//!
//! let codec = FieldCodec::new(&SecretString::from("passphrase".to_string()))?;
//! let token = codec.encode("account.name")?;
//! assert_eq!(codec.decode(&token)?, "account.name");
//! ```

use crate::security::kdf::{KdfParams, SUBKEY_LEN, derive_keys};
use crate::{Error, Result};

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use zeroize::Zeroize;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits).
const NONCE_SIZE: usize = 12;

/// Authentication tag size for AES-256-GCM.
const TAG_SIZE: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Direction in which a [`FieldCodec`] is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecMode {
    /// Plaintext to token.
    Encode,
    /// Token to plaintext.
    Decode,
}

/// Returns true if `c` can appear in an encoded token.
#[must_use]
pub const fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Symmetric field codec keyed by a passphrase.
pub struct FieldCodec {
    cipher: Aes256Gcm,
    nonce_key: [u8; SUBKEY_LEN],
}

impl FieldCodec {
    /// Creates a codec from a passphrase with the default KDF cost.
    ///
    /// # Errors
    ///
    /// Returns an error if key derivation fails.
    pub fn new(passphrase: &SecretString) -> Result<Self> {
        Self::with_params(passphrase, &KdfParams::default())
    }

    /// Creates a codec from a passphrase with explicit KDF cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the parameters are unusable, or
    /// [`Error::OperationFailed`] if key derivation fails.
    pub fn with_params(passphrase: &SecretString, params: &KdfParams) -> Result<Self> {
        let keys = derive_keys(passphrase.expose_secret().as_bytes(), params)?;

        let cipher = Aes256Gcm::new_from_slice(keys.cipher_key()).map_err(|e| {
            Error::OperationFailed {
                operation: "init_cipher".to_string(),
                cause: e.to_string(),
            }
        })?;
        let mut nonce_key = [0u8; SUBKEY_LEN];
        nonce_key.copy_from_slice(keys.nonce_key());

        Ok(Self { cipher, nonce_key })
    }

    /// Applies the codec in the given direction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if decoding fails, or
    /// [`Error::OperationFailed`] if encryption fails.
    pub fn transform(&self, mode: CodecMode, input: &str) -> Result<String> {
        match mode {
            CodecMode::Encode => self.encode(input),
            CodecMode::Decode => self.decode(input),
        }
    }

    /// Encodes a plaintext field into a token.
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails.
    pub fn encode(&self, plaintext: &str) -> Result<String> {
        let nonce_bytes = self.synthetic_nonce(plaintext.as_bytes())?;
        let nonce = Nonce::from(nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| Error::OperationFailed {
                operation: "encode_field".to_string(),
                cause: format!("AES-256-GCM encryption failed: {e}"),
            })?;

        let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&ciphertext);

        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Decodes a token back into its plaintext field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the token is malformed, was produced under
    /// another passphrase, or has been tampered with.
    pub fn decode(&self, token: &str) -> Result<String> {
        let payload = URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .map_err(|e| decode_error(format!("invalid base64: {e}")))?;

        let min_size = NONCE_SIZE + TAG_SIZE;
        if payload.len() < min_size {
            return Err(decode_error(format!(
                "payload too short: {} bytes, minimum {min_size}",
                payload.len()
            )));
        }

        let (nonce_part, ciphertext) = payload.split_at(NONCE_SIZE);
        let nonce_bytes: [u8; NONCE_SIZE] = nonce_part
            .try_into()
            .map_err(|_| decode_error("invalid nonce length".to_string()))?;

        let plaintext = self
            .cipher
            .decrypt(&Nonce::from(nonce_bytes), ciphertext)
            .map_err(|_| {
                decode_error(
                    "authentication failed (wrong passphrase or corrupted data)".to_string(),
                )
            })?;

        if self.synthetic_nonce(&plaintext)? != nonce_bytes {
            return Err(decode_error("nonce does not match plaintext".to_string()));
        }

        String::from_utf8(plaintext).map_err(|e| decode_error(format!("invalid UTF-8: {e}")))
    }

    fn synthetic_nonce(&self, plaintext: &[u8]) -> Result<[u8; NONCE_SIZE]> {
        let mut mac =
            <HmacSha256 as Mac>::new_from_slice(&self.nonce_key).map_err(|e| {
                Error::OperationFailed {
                    operation: "derive_nonce".to_string(),
                    cause: e.to_string(),
                }
            })?;
        mac.update(plaintext);
        let tag = mac.finalize().into_bytes();

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&tag[..NONCE_SIZE]);
        Ok(nonce)
    }
}

impl Drop for FieldCodec {
    fn drop(&mut self) {
        self.nonce_key.zeroize();
    }
}

impl std::fmt::Debug for FieldCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCodec").finish_non_exhaustive()
    }
}

const fn decode_error(reason: String) -> Error {
    Error::Decode { line: None, reason }
}
