//! # Settings Import
//!
//! Restores application settings from an encrypted, line-oriented export
//! into a key-value store.
//!
//! Each line of an export carries one setting as two independently encrypted
//! fields. During import every account UUID found in the export is replaced
//! by a freshly generated one and every `accountNumber` is renumbered to the
//! lowest number still free in the destination, so importing the same file
//! twice yields two independent sets of accounts.
//!
//! ## Pipeline
//!
//! 1. [`io::RecordReader`] splits the blob into lines and decodes both fields
//!    with [`security::FieldCodec`].
//! 2. [`models::StructuredKey`] parses the decoded key into dotted segments.
//! 3. [`services::IdentityRemapper`] rewrites group identifiers and allocates
//!    account numbers.
//! 4. [`services::ImportService`] drives the fold and writes into a
//!    [`storage::SettingsStore`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use settings_import::{ImportConfig, ImportService, MemorySettingsStore};
//! use secrecy::SecretString;
//!
//! let service = ImportService::new(ImportConfig::default());
//! let mut store = MemorySettingsStore::new();
//! let secret = SecretString::from("passphrase".to_string());
//! let result = service.import_into_store(&blob, &secret, &mut store)?;
//! println!("Created {} accounts", result.groups_created);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::ImportConfig;
pub use io::{ImportRecord, RecordReader};
pub use models::{GroupId, GroupRegistry, StructuredKey};
pub use security::{CodecMode, FieldCodec, KdfParams};
pub use services::{ImportOptions, ImportRequest, ImportResult, ImportService};
pub use storage::{MemorySettingsStore, SettingsStore};

/// Error type for settings import operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Decode` | A field cannot be decrypted (wrong passphrase, corrupted token) |
/// | `AllocationExhausted` | Every account number is already taken |
/// | `StoreWrite` | The destination store rejects a write |
/// | `InvalidInput` | Configuration values are unusable |
/// | `OperationFailed` | Config file I/O or parsing fails, logging init fails |
///
/// Lines that cannot be split into two fields are not errors; the reader
/// skips them.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A field could not be decoded.
    ///
    /// Raised when:
    /// - The token is not valid URL-safe base64
    /// - The payload is shorter than nonce plus authentication tag
    /// - Authentication fails (wrong passphrase or corrupted data)
    /// - The decrypted bytes are not UTF-8
    #[error(
        "decode failed{}: {reason}",
        .line.map(|n| format!(" at line {n}")).unwrap_or_default()
    )]
    Decode {
        /// 1-based line number of the failing record, when known.
        line: Option<usize>,
        /// Why decoding failed.
        reason: String,
    },

    /// No account number is left to allocate.
    #[error("account number space exhausted")]
    AllocationExhausted,

    /// The destination store rejected a write.
    #[error("store write for '{key}' failed: {cause}")]
    StoreWrite {
        /// The key being written.
        key: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - The configured field separator can appear inside encoded tokens
    /// - The registry key or index field name is empty
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - A configuration file cannot be read or parsed
    /// - Logging has already been initialized
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Attaches a line number to a decode error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn at_line(self, line_number: usize) -> Self {
        match self {
            Self::Decode { reason, .. } => Self::Decode {
                line: Some(line_number),
                reason,
            },
            other => other,
        }
    }

    /// Short label used for failure metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::AllocationExhausted => "allocation_exhausted",
            Self::StoreWrite { .. } => "store_write",
            Self::InvalidInput(_) => "invalid_input",
            Self::OperationFailed { .. } => "operation_failed",
        }
    }
}

/// Result type alias for settings import operations.
pub type Result<T> = std::result::Result<T, Error>;
