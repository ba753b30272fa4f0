//! Engine configuration and its TOML loader.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working configuration rooted at `data/`.

use std::path::{Path, PathBuf};

use place_rules::DEFAULT_WEATHER;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("failed to parse config TOML: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Default configuration with every document stored under `data_root`.
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                data_root: data_root.into(),
                ..StorageConfig::default()
            },
            generation: GenerationConfig::default(),
        }
    }
}

/// Where documents live. Relative directories resolve against `data_root`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_root: PathBuf,
    pub playthroughs_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub guidelines_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            playthroughs_dir: PathBuf::from("playthroughs"),
            templates_dir: PathBuf::from("templates"),
            guidelines_file: PathBuf::from("character_generation_guidelines.json"),
        }
    }
}

impl StorageConfig {
    pub fn playthroughs_path(&self) -> PathBuf {
        self.data_root.join(&self.playthroughs_dir)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.data_root.join(&self.templates_dir)
    }

    pub fn guidelines_path(&self) -> PathBuf {
        self.data_root.join(&self.guidelines_file)
    }
}

/// Defaults applied to newly generated places.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub default_weather: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_weather: DEFAULT_WEATHER.to_string(),
        }
    }
}
