//! Registry configuration, loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use nomos_contract::Filter;
use serde::{Deserialize, Serialize};

use crate::contracts::NameMustBeWellFormed;

/// Errors raised while loading a [`TypingConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// A key holds an unusable value.
    #[error("invalid `{key}`: {reason}")]
    Invalid {
        /// The offending key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Settings owned by a [`Registry`](crate::Registry).
///
/// ```
/// use nomos_typing::TypingConfig;
///
/// let config = TypingConfig::from_toml_str("tag_separator = \"+\"").unwrap();
/// assert_eq!(config.tag_separator, "+");
/// assert_eq!(config.root_name, "root");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypingConfig {
    /// Separator used when joining tag names.
    pub tag_separator: String,
    /// Name of the root namespace.
    pub root_name: String,
    /// Prefix of the staging namespaces given to in-flight sub-types.
    pub staging_prefix: String,
    /// Whether private symbols are inherited by sub-types.
    pub inherit_private_symbols: bool,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            tag_separator: ",".to_string(),
            root_name: "root".to_string(),
            staging_prefix: "staging".to_string(),
            inherit_private_symbols: false,
        }
    }
}

impl TypingConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Invalid`] for unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// errors of [`TypingConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first unusable key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag_separator.is_empty() {
            return Err(ConfigError::Invalid {
                key: "tag_separator",
                reason: "must not be empty".to_string(),
            });
        }
        for (key, value) in [
            ("root_name", &self.root_name),
            ("staging_prefix", &self.staging_prefix),
        ] {
            if NameMustBeWellFormed.filter(value.as_str()).is_discarded() {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("{value:?} is not a well-formed name"),
                });
            }
        }
        Ok(())
    }
}
