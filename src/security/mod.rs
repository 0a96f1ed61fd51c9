//! Security features.
//!
//! Hosts the symmetric field codec used to decrypt settings exports and the
//! Argon2id derivation of its keys.

pub mod codec;
pub mod kdf;

pub use codec::{CodecMode, FieldCodec, is_token_char};
pub use kdf::KdfParams;
