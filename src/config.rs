//! Configuration management.
//!
//! The engine reads configuration once at the start of each pipeline call;
//! it never touches the environment or filesystem on its own.

use serde::Deserialize;
use std::path::Path;

/// Default batch size for paginated exports.
///
/// A memory bound, not a correctness constraint: paging must be lossless at
/// any batch size.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default sensitive field-name markers.
///
/// A field is considered sensitive when its raw name contains any marker as
/// a case-sensitive substring ("passw" matches "password").
#[must_use]
pub fn default_sensitive_markers() -> Vec<String> {
    [
        "passw",
        "secret",
        "token",
        "_key",
        "crypt",
        "salt",
        "certificate",
        "otp",
        "ssn",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

/// Main configuration for stevedore.
#[derive(Debug, Clone)]
pub struct StevedoreConfig {
    /// Field-name fragments that mark a field as sensitive.
    pub sensitive_markers: Vec<String>,
    /// Default number of records per export artifact.
    pub default_batch_size: usize,
}

impl Default for StevedoreConfig {
    fn default() -> Self {
        Self {
            sensitive_markers: default_sensitive_markers(),
            default_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Sensitive field-name markers.
    pub sensitive_markers: Option<Vec<String>>,
    /// Default batch size.
    pub default_batch_size: Option<usize>,
}

impl StevedoreConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the sensitive markers.
    #[must_use]
    pub fn with_sensitive_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a single sensitive marker.
    #[must_use]
    pub fn with_sensitive_marker(mut self, marker: impl Into<String>) -> Self {
        self.sensitive_markers.push(marker.into());
        self
    }

    /// Sets the default batch size.
    #[must_use]
    pub const fn with_default_batch_size(mut self, size: usize) -> Self {
        self.default_batch_size = size;
        self
    }

    /// Loads configuration from a TOML file.
    ///
    /// Missing keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| {
            crate::Error::Configuration(format!("cannot parse {}: {e}", path.display()))
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Converts a `ConfigFile` to `StevedoreConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(markers) = file.sensitive_markers {
            config.sensitive_markers = markers;
        }
        if let Some(size) = file.default_batch_size {
            config.default_batch_size = size;
        }
        config
    }
}
