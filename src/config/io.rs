//! Configuration file I/O operations

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.ecoquest/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ecoquest")
    }

    /// Get the global config file path (~/.ecoquest/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load from an explicit path, or the global config, or defaults
    ///
    /// An explicit path must exist. A missing global config is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let global_path = Self::global_config_path();
                if global_path.exists() {
                    Self::from_file(&global_path)
                } else {
                    tracing::debug!("No config at {}, using defaults", global_path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration, holding `<path>.lock` while the new file is
    /// written beside the old one and renamed over it
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        let content = format!("{}{}", CONFIG_HEADER, body);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let _lock = lock_config(path)?;
        let temp_path = path.with_extension("toml.tmp");
        write_synced(&temp_path, content.as_bytes())?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace config file: {}", path.display()))
    }
}

const CONFIG_HEADER: &str = "\
# EcoQuest configuration
# The Gemini API key is read from the variable named by generator.api_key_env.

";

/// Exclusive lock on the config's sibling lock file, released on drop
fn lock_config(path: &Path) -> Result<File> {
    let lock_path = path.with_extension("toml.lock");
    let lock = File::create(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;
    lock.lock_exclusive()
        .with_context(|| format!("Config is locked by another process: {}", path.display()))?;
    Ok(lock)
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create temp file: {}", path.display()))?;
    file.write_all(bytes)
        .and_then(|_| file.sync_all())
        .with_context(|| format!("Failed to write config: {}", path.display()))
}
