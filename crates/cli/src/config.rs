//! Configuration loading for the command-line front end.
//!
//! All settings are optional: a missing file falls back to defaults, a
//! partial file fills the gaps per section, and `--seed` on the command
//! line overrides the file value.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// General run settings
    pub general: GeneralSettings,
    /// Console display settings
    pub display: DisplaySettings,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            general: GeneralSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::TomlError)
    }
}

/// General run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Default seed when --seed is not given
    pub seed: u64,
    /// Directory run reports are written to
    pub out_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            out_dir: "output".to_string(),
        }
    }
}

/// Console display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Width of metric bars, in characters
    pub bar_width: usize,
    /// Steps between progress lines
    pub progress_interval: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            bar_width: 20,
            progress_interval: 25,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    IoError(std::io::Error),
    /// Error parsing TOML config
    TomlError(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::TomlError(e) => Some(e),
        }
    }
}
