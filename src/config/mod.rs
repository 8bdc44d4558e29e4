//! Configuration loading.
//!
//! A missing file yields defaults; a present but malformed file is an error.

pub mod schema;

pub use schema::{
    BackendConfig, Config, FieldMode, ProgressStrategy, UploadConfig, VoiceConfig,
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// `<platform config dir>/askpanel/config.toml`, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "askpanel").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load from `path` (tilde-expanded) or the default location.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let path = match path {
            Some(p) => PathBuf::from(shellexpand::tilde(p).to_string()),
            None => match default_config_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.normalize();
        Ok(config)
    }

    /// JSON Schema of the config file, pretty-printed.
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(Config);
        Ok(serde_json::to_string_pretty(&schema)?)
    }

    fn normalize(&mut self) {
        let trimmed = self.backend.base_url.trim_end_matches('/').to_string();
        self.backend.base_url = trimmed;
        for ext in &mut self.upload.allowed_extensions {
            *ext = ext.trim_start_matches('.').to_lowercase();
        }
    }
}
