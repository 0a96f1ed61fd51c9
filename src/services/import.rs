//! Settings import service.
//!
//! Orchestrates decoding, key parsing, identity remapping, and store writes
//! for one encrypted settings export.

use crate::config::ImportConfig;
use crate::io::RecordReader;
use crate::models::{GroupId, GroupRegistry, StructuredKey};
use crate::security::FieldCodec;
use crate::services::remap::{
    IdentifierGenerator, IdentityRemapper, IndexAllocator, UuidGenerator,
};
use crate::storage::SettingsStore;
use crate::{Error, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::instrument;

/// Options for settings import.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Dry run mode (decode and remap without writing).
    pub dry_run: bool,
}

impl ImportOptions {
    /// Enables or disables dry run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Inputs for one import.
///
/// The destination's allocation state is passed in explicitly; the deltas
/// come back in [`ImportResult`].
#[derive(Debug, Clone, Copy)]
pub struct ImportRequest<'a> {
    /// Encrypted export, one record per line.
    pub data: &'a str,
    /// Passphrase the export was encrypted with.
    pub secret: &'a SecretString,
    /// Account numbers already used by the destination.
    pub existing_account_numbers: &'a [u32],
    /// Current value of the destination's group registry, if any.
    pub group_registry: Option<&'a str>,
}

impl<'a> ImportRequest<'a> {
    /// Creates a request for an empty destination.
    #[must_use]
    pub const fn new(data: &'a str, secret: &'a SecretString) -> Self {
        Self {
            data,
            secret,
            existing_account_numbers: &[],
            group_registry: None,
        }
    }

    /// Sets the destination's existing account numbers.
    #[must_use]
    pub const fn with_existing_account_numbers(mut self, numbers: &'a [u32]) -> Self {
        self.existing_account_numbers = numbers;
        self
    }

    /// Sets the destination's current group registry value.
    #[must_use]
    pub const fn with_group_registry(mut self, registry: Option<&'a str>) -> Self {
        self.group_registry = registry;
        self
    }
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Number of settings written.
    pub settings_imported: usize,
    /// Number of accounts created.
    pub groups_created: usize,
    /// Non-blank lines skipped as malformed.
    pub lines_skipped: usize,
    /// New group identifiers, in registration order.
    pub new_groups: Vec<GroupId>,
    /// Account numbers allocated, in allocation order.
    pub allocated_account_numbers: Vec<u32>,
    /// Group registry value written at the end of the import.
    pub group_registry: String,
}

/// Service for importing encrypted settings exports.
pub struct ImportService {
    config: ImportConfig,
    options: ImportOptions,
    generator: Arc<dyn IdentifierGenerator>,
}

impl ImportService {
    /// Creates a new import service using random UUIDs for new accounts.
    #[must_use]
    pub fn new(config: ImportConfig) -> Self {
        Self {
            config,
            options: ImportOptions::default(),
            generator: Arc::new(UuidGenerator),
        }
    }

    /// Replaces the identifier generator.
    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn IdentifierGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Sets import options.
    #[must_use]
    pub const fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Imports settings, reading the destination's state from the store.
    ///
    /// The group registry is read with [`SettingsStore::get`] and existing
    /// account numbers with [`SettingsStore::account_numbers`].
    ///
    /// # Errors
    ///
    /// See [`ImportService::import`].
    pub fn import_into_store<S: SettingsStore>(
        &self,
        data: &str,
        secret: &SecretString,
        store: &mut S,
    ) -> Result<ImportResult> {
        let registry = store.get(&self.config.group_registry_key)?;
        let existing = store.account_numbers(&self.config.index_field)?;

        let request = ImportRequest::new(data, secret)
            .with_existing_account_numbers(&existing)
            .with_group_registry(registry.as_deref());

        self.import(request, store)
    }

    /// Imports settings into `store`.
    ///
    /// Every decoded setting is written with its group identifier replaced
    /// and, for account number fields, a freshly allocated number. The
    /// updated group registry is written last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the configuration is unusable,
    /// [`Error::Decode`] if any field fails to decode,
    /// [`Error::AllocationExhausted`] if no account number is free, or
    /// [`Error::StoreWrite`] if the store rejects a write. The import stops
    /// at the first error.
    #[instrument(
        skip_all,
        fields(
            operation = "settings_import",
            bytes = request.data.len(),
            dry_run = self.options.dry_run
        )
    )]
    pub fn import<S: SettingsStore>(
        &self,
        request: ImportRequest<'_>,
        store: &mut S,
    ) -> Result<ImportResult> {
        let result = self.run(request, store);
        match &result {
            Ok(r) => {
                metrics::counter!("settings_import_records_total")
                    .increment(r.settings_imported as u64);
                metrics::counter!("settings_import_groups_created_total")
                    .increment(r.groups_created as u64);
                metrics::counter!("settings_import_lines_skipped_total")
                    .increment(r.lines_skipped as u64);
                tracing::info!(
                    settings = r.settings_imported,
                    groups = r.groups_created,
                    skipped = r.lines_skipped,
                    "Imported {} settings and {} groups",
                    r.settings_imported,
                    r.groups_created
                );
            },
            Err(e) => {
                metrics::counter!("settings_import_failures_total", "reason" => e.kind())
                    .increment(1);
                tracing::warn!(error = %e, "Settings import failed");
            },
        }
        result
    }

    fn run<S: SettingsStore>(
        &self,
        request: ImportRequest<'_>,
        store: &mut S,
    ) -> Result<ImportResult> {
        self.config.validate()?;
        tracing::info!(
            existing = ?request.existing_account_numbers,
            "Existing account numbers"
        );

        let codec = FieldCodec::with_params(request.secret, &self.config.kdf)?;
        let mut reader = RecordReader::new(request.data, &codec, self.config.field_separator);
        let allocator = IndexAllocator::new(request.existing_account_numbers.iter().copied());
        let mut remapper =
            IdentityRemapper::new(self.generator.as_ref(), &self.config.index_field, allocator);
        let mut registry = GroupRegistry::parse(request.group_registry);
        let mut result = ImportResult::default();

        for record in reader.by_ref() {
            let record = record?;
            let outcome = remapper.remap(StructuredKey::parse(&record.key), record.value)?;
            let key = outcome.key.to_string();

            self.write(store, &key, &outcome.value)?;
            result.settings_imported += 1;

            if let Some(number) = outcome.account_number {
                result.groups_created += 1;
                tracing::debug!(key = %key, account_number = number, "Allocated account number");
            }
        }
        result.lines_skipped = reader.skipped();

        let delta = remapper.into_delta();
        for id in &delta.registered {
            registry.push(id);
        }
        result.group_registry = registry.to_stored();
        self.write(store, &self.config.group_registry_key, &result.group_registry)?;

        result.new_groups = delta.registered;
        result.allocated_account_numbers = delta.allocated;
        Ok(result)
    }

    fn write<S: SettingsStore>(&self, store: &mut S, key: &str, value: &str) -> Result<()> {
        if self.options.dry_run {
            return Ok(());
        }
        store.put(key, value).map_err(|e| match e {
            Error::StoreWrite { .. } => e,
            other => Error::StoreWrite {
                key: key.to_string(),
                cause: other.to_string(),
            },
        })
    }
}
