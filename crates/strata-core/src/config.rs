use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Process-wide settings, read from `~/.config/strata/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrataConfig {
    /// Seal description payloads in the secret store instead of storing plaintext.
    #[serde(default)]
    pub encrypt_data: bool,
    /// Store root used when `--store` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl StrataConfig {
    /// Load the default config file, or defaults when there is none.
    pub fn load_default() -> Result<Self, CoreError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("invalid config {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| CoreError::Config(format!("TOML serialization failed: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    #[must_use]
    pub fn with_encrypt_data(mut self, encrypt_data: bool) -> Self {
        self.encrypt_data = encrypt_data;
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config/strata/config.toml"))
}
