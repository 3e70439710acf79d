//! Configuration loading and management

mod io;
mod settings;

pub use settings::{GeneratorSettings, ProgressionSettings, StorageSettings};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Puzzle generator / answer oracle
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Persistence
    #[serde(default)]
    pub storage: StorageSettings,

    /// Award handling
    #[serde(default)]
    pub progression: ProgressionSettings,
}

impl Config {
    /// Database path, falling back to ~/.ecoquest/progress.db
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }
}
