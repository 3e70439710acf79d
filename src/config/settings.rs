//! Settings sections

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Content generator and answer oracle backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// API root, without the `/v1beta/...` path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for both generation and judging
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key (the key itself never lands in the file)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Read timeout per request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-pro".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Ledger and session persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database path (defaults to ~/.ecoquest/progress.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// Progression engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionSettings {
    /// How many times an award is reloaded and re-applied after losing a
    /// version race before the conflict is returned to the caller
    #[serde(default = "default_max_award_retries")]
    pub max_award_retries: u32,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            max_award_retries: default_max_award_retries(),
        }
    }
}

fn default_max_award_retries() -> u32 {
    5
}
