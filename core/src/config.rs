//! History configuration loaded from TOML.
//!
//! ```toml
//! [history]
//! limit = 100   # negative for unlimited
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default maximum number of retained edits.
pub const DEFAULT_LIMIT: usize = 100;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryConfig {
    #[serde(default)]
    pub history: HistorySection,
}

/// The `[history]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySection {
    /// Maximum number of retained edits; negative means unlimited.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}

impl HistoryConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The configured limit, `None` when unlimited.
    pub fn limit(&self) -> Option<usize> {
        usize::try_from(self.history.limit).ok()
    }
}

/// Load a history config from a TOML file.
pub fn load_config(path: &Path) -> Result<HistoryConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    HistoryConfig::from_toml_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
