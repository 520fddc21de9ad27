use anyhow::{Context, Result};
use genx_memory::DEFAULT_HISTORY_CAPACITY;
use genx_providers::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const CONFIG_STORE_FILE: &str = "genx-config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub command_timeout_ms: u64,
    pub history_capacity: usize,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            command_timeout_ms: 30_000,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    /// `<config dir>/genx/config.yaml`, or `./genx/config.yaml` when the
    /// platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("genx")
            .join("config.yaml")
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Read the YAML file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            anyhow::bail!("Model cannot be empty");
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            anyhow::bail!("Base URL must start with http:// or https://");
        }
        if self.command_timeout_ms == 0 {
            anyhow::bail!("Command timeout must be greater than zero");
        }
        if self.history_capacity == 0 {
            anyhow::bail!("History capacity must be greater than zero");
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn config_store_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_STORE_FILE)
    }

    /// Pick the credential: environment first, then the persistent store
    /// (written by `/config set-key`), then this file.
    pub fn resolve_api_key(&self, env: Option<String>, stored: Option<String>) -> Option<String> {
        [env, stored, self.api_key.clone()]
            .into_iter()
            .flatten()
            .map(|key| key.trim().to_string())
            .find(|key| !key.is_empty())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("./data"))
        .join("genx")
}
