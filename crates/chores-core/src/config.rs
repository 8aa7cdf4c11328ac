use crate::gateway::DEFAULT_STORAGE_KEY;
use crate::lock::DEFAULT_LOCK_TIMEOUT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an alternate config file.
pub const CONFIG_ENV: &str = "CHORES_CONFIG";
/// Environment variable naming the database file.
pub const DB_ENV: &str = "CHORES_DB";

const APP_DIR: &str = "chores";
const DB_FILE_NAME: &str = "chores.sqlite3";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_storage_key")]
    pub key: String,
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Location of the user config file: `$CHORES_CONFIG` when set, otherwise
/// `<config_dir>/chores/config.toml`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_user_config_from(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Read a config file. A missing file yields the defaults.
pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    parse_user_config(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_user_config(content: &str) -> Result<UserConfig> {
    let config = toml::from_str::<UserConfig>(content)?;
    if config.storage.key.trim().is_empty() {
        anyhow::bail!("storage.key must not be empty");
    }
    Ok(config)
}

/// `<data_dir>/chores/chores.sqlite3`, or a file in the working directory
/// when the platform has no data directory.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_dir().map_or_else(
        || PathBuf::from(DB_FILE_NAME),
        |dir| dir.join(APP_DIR).join(DB_FILE_NAME),
    )
}

/// Pick the database path: flag, then `CHORES_DB`, then config, then the
/// platform default.
#[must_use]
pub fn resolve_db_path(
    flag: Option<&Path>,
    env_value: Option<&str>,
    config: &UserConfig,
) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(value) = env_value.map(str::trim).filter(|value| !value.is_empty()) {
        return PathBuf::from(value);
    }
    if let Some(path) = &config.storage.path {
        return path.clone();
    }
    default_db_path()
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

const fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT.as_secs() * 1000
}
