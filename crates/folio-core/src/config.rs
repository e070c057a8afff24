//! Folio configuration
//!
//! Loaded from TOML; every section and field is optional.
//!
//! ```toml
//! [sequence.insert_mode]
//! mode = "optimistic"
//! max_attempts = 3
//!
//! [masonry]
//! row_unit_px = 8.0
//! gap_px = 12.0
//!
//! [storage]
//! image_bucket = "pf_article_images"
//! ```

use folio_masonry::{MasonryConfig, MasonryConfigError};
use folio_sequence::SequenceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        /// Config file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid configuration
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed, but the values cannot be used
    #[error("invalid masonry settings: {0}")]
    Invalid(#[from] MasonryConfigError),
}

/// Where uploaded images go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket for block images
    pub image_bucket: String,
    /// Path prefix inside the bucket
    pub path_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            image_bucket: "pf_article_images".to_string(),
            path_prefix: "blocks".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Block sequencing
    pub sequence: SequenceConfig,
    /// Gallery layout
    pub masonry: MasonryConfig,
    /// Image storage
    pub storage: StorageConfig,
}

impl FolioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed input and
    /// `ConfigError::Invalid` for unusable layout metrics.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section holds usable values
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for unusable layout metrics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(self.masonry.validate()?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if unreadable, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// With sequencing configuration
    #[inline]
    #[must_use]
    pub fn with_sequence(mut self, sequence: SequenceConfig) -> Self {
        self.sequence = sequence;
        self
    }

    /// With layout configuration
    #[inline]
    #[must_use]
    pub fn with_masonry(mut self, masonry: MasonryConfig) -> Self {
        self.masonry = masonry;
        self
    }

    /// With storage configuration
    #[inline]
    #[must_use]
    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }
}
