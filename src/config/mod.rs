//! Configuration management.

use serde::Deserialize;
use std::path::Path;

use crate::observability::{LogFormat, LoggingConfig};
use crate::security::{KdfParams, is_token_char};
use crate::{Error, Result};

/// Application name used for config directory lookup.
const APP_NAME: &str = "settings-import";

/// Default field separator between the encoded key and value.
pub const DEFAULT_FIELD_SEPARATOR: char = ':';

/// Default key under which the destination keeps its account UUID list.
pub const DEFAULT_GROUP_REGISTRY_KEY: &str = "accountUuids";

/// Default terminal key segment that holds an account's number.
pub const DEFAULT_INDEX_FIELD: &str = "accountNumber";

/// Main configuration for settings import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Character separating the encoded key from the encoded value.
    pub field_separator: char,
    /// Key of the comma-joined group registry.
    pub group_registry_key: String,
    /// Terminal key segment that triggers account number allocation.
    pub index_field: String,
    /// Argon2id cost used to derive the codec keys.
    pub kdf: KdfParams,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Field separator.
    pub field_separator: Option<char>,
    /// Group registry key.
    pub group_registry_key: Option<String>,
    /// Index field name.
    pub index_field: Option<String>,
    /// Key derivation cost.
    pub kdf: Option<ConfigFileKdf>,
    /// Logging configuration.
    pub logging: Option<ConfigFileLogging>,
}

/// Key derivation section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileKdf {
    /// Memory cost in KiB.
    pub memory_kib: Option<u32>,
    /// Number of passes.
    pub iterations: Option<u32>,
    /// Degree of parallelism.
    pub parallelism: Option<u32>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Filter directive.
    pub level: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            field_separator: DEFAULT_FIELD_SEPARATOR,
            group_registry_key: DEFAULT_GROUP_REGISTRY_KEY.to_string(),
            index_field: DEFAULT_INDEX_FIELD.to_string(),
            kdf: KdfParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ImportConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or the configuration is
    /// invalid.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        let config = Self::from_config_file(file);
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/settings-import/` on macOS)
    /// 2. XDG config dir (`~/.config/settings-import/`)
    ///
    /// Returns default configuration if no usable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join(APP_NAME).join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join(APP_NAME)
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring invalid config file"
                    );
                },
            }
        }

        Self::default()
    }

    /// Checks that the configuration can be used for an import.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the separator could appear inside an
    /// encoded token or a key segment, if a name is empty, or if the KDF
    /// parameters are out of range.
    pub fn validate(&self) -> Result<()> {
        let sep = self.field_separator;
        if is_token_char(sep) || sep == crate::models::SEGMENT_SEPARATOR || sep.is_whitespace() {
            return Err(Error::InvalidInput(format!(
                "field separator {sep:?} may appear inside encoded tokens or keys"
            )));
        }
        if self.group_registry_key.is_empty() {
            return Err(Error::InvalidInput(
                "group registry key must not be empty".to_string(),
            ));
        }
        if self.index_field.is_empty()
            || self.index_field.contains(crate::models::SEGMENT_SEPARATOR)
        {
            return Err(Error::InvalidInput(format!(
                "index field {:?} must be a single non-empty key segment",
                self.index_field
            )));
        }
        self.kdf.validate()
    }

    /// Converts a `ConfigFile` to `ImportConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(sep) = file.field_separator {
            config.field_separator = sep;
        }
        if let Some(key) = file.group_registry_key {
            config.group_registry_key = key;
        }
        if let Some(field) = file.index_field {
            config.index_field = field;
        }
        if let Some(kdf) = file.kdf {
            if let Some(memory_kib) = kdf.memory_kib {
                config.kdf.memory_kib = memory_kib;
            }
            if let Some(iterations) = kdf.iterations {
                config.kdf.iterations = iterations;
            }
            if let Some(parallelism) = kdf.parallelism {
                config.kdf.parallelism = parallelism;
            }
        }
        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
        }

        config
    }

    /// Sets the field separator.
    #[must_use]
    pub const fn with_field_separator(mut self, separator: char) -> Self {
        self.field_separator = separator;
        self
    }

    /// Sets the group registry key.
    #[must_use]
    pub fn with_group_registry_key(mut self, key: impl Into<String>) -> Self {
        self.group_registry_key = key.into();
        self
    }

    /// Sets the index field name.
    #[must_use]
    pub fn with_index_field(mut self, field: impl Into<String>) -> Self {
        self.index_field = field.into();
        self
    }

    /// Sets the key derivation cost.
    #[must_use]
    pub const fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.field_separator, ':');
        assert_eq!(config.group_registry_key, "accountUuids");
        assert_eq!(config.index_field, "accountNumber");
        assert!(config.validate().is_ok());
    }

    #[test_case(':', true ; "colon")]
    #[test_case('|', true ; "pipe")]
    #[test_case('A', false ; "base64 letter")]
    #[test_case('-', false ; "url safe dash")]
    #[test_case('_', false ; "url safe underscore")]
    #[test_case('.', false ; "key segment dot")]
    #[test_case(' ', false ; "space")]
    fn test_separator_validation(sep: char, valid: bool) {
        let config = ImportConfig::default().with_field_separator(sep);
        assert_eq!(config.validate().is_ok(), valid);
    }

    #[test]
    fn test_index_field_validation() {
        assert!(ImportConfig::default().with_index_field("").validate().is_err());
        assert!(ImportConfig::default().with_index_field("a.b").validate().is_err());
        assert!(ImportConfig::default().with_group_registry_key("").validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = ImportConfig::from_toml(
            r#"
            field_separator = "|"
            group_registry_key = "profileIds"

            [logging]
            format = "json"
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.field_separator, '|');
        assert_eq!(config.group_registry_key, "profileIds");
        assert_eq!(config.index_field, "accountNumber");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_kdf_from_toml() {
        let config = ImportConfig::from_toml(
            r#"
            [kdf]
            memory_kib = 4096
            iterations = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.kdf, KdfParams::new(4096, 2, 1));
    }

    #[test]
    fn test_kdf_validation() {
        let err = ImportConfig::from_toml("[kdf]\nmemory_kib = 1").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(ImportConfig::default()
            .with_kdf(KdfParams::new(64, 0, 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_toml_rejects_bad_separator() {
        let err = ImportConfig::from_toml(r#"field_separator = "x""#).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_from_toml_parse_error() {
        let err = ImportConfig::from_toml("field_separator = [").unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "index_field = \"profileNumber\"").unwrap();

        let config = ImportConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.index_field, "profileNumber");
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = ImportConfig::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }
}
