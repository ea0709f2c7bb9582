use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Overrides the platform configuration directory.
    #[serde(default)]
    pub config_dir: Option<PathBuf>,
    /// Overrides the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { app_name: default_app_name(), config_dir: None, data_dir: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), retry: RetryConfig::default() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_retry_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_retry_enabled(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base(),
            backoff_max_ms: default_backoff_max(),
        }
    }
}

fn default_app_name() -> String { "pomostate".to_string() }
fn default_debounce_ms() -> u64 { 500 }
fn default_retry_enabled() -> bool { true }
fn default_max_attempts() -> u32 { 3 }
fn default_backoff_base() -> u64 { 100 }
fn default_backoff_max() -> u64 { 2000 }

/// Load from `CONFIG_PATH` (default `pomostate.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "pomostate.toml".to_string());
    if !Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| anyhow!("cannot read {path}: {e}"))?;
    parse(&content)
}

fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize_from_env();
        self.persistence.validate()?;
        Ok(())
    }
}

impl StorageConfig {
    /// Blank names fall back to the default; `POMOSTATE_CONFIG_DIR` and
    /// `POMOSTATE_DATA_DIR` take precedence over the file.
    pub fn normalize_from_env(&mut self) {
        if self.app_name.trim().is_empty() {
            self.app_name = default_app_name();
        }
        if let Ok(dir) = std::env::var("POMOSTATE_CONFIG_DIR") {
            if !dir.trim().is_empty() {
                self.config_dir = Some(PathBuf::from(dir));
            }
        }
        if let Ok(dir) = std::env::var("POMOSTATE_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = Some(PathBuf::from(dir));
            }
        }
    }
}

impl PersistenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(anyhow!("persistence.debounce_ms must be >= 1"));
        }
        self.retry.validate()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl RetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.max_attempts == 0 {
            return Err(anyhow!("persistence.retry.max_attempts must be >= 1"));
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(anyhow!("persistence.retry.backoff_max_ms must be >= backoff_base_ms"));
        }
        Ok(())
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    pub fn backoff_max(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }
}
