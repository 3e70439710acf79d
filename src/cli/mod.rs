//! CLI command implementations

pub mod init;
pub mod play;
pub mod profile;
pub mod topics;

use std::sync::Arc;

use anyhow::{Context, Result};

use ecoquest::config::Config;
use ecoquest::content::GeminiClient;
use ecoquest::progression::ProgressionEngine;
use ecoquest::store::{MemoryStore, SqliteStore};

/// Wire the engine to Gemini and the configured store
///
/// `ephemeral` keeps everything in memory for a throwaway run.
pub fn build_engine(config: &Config, ephemeral: bool) -> Result<ProgressionEngine> {
    let gemini = Arc::new(GeminiClient::from_settings(&config.generator));

    let engine = if ephemeral {
        let store = Arc::new(MemoryStore::new());
        ProgressionEngine::new(gemini.clone(), gemini, store.clone(), store)
    } else {
        let path = config.db_path();
        let store = Arc::new(
            SqliteStore::open(&path)
                .with_context(|| format!("Failed to open progress db: {}", path.display()))?,
        );
        ProgressionEngine::new(gemini.clone(), gemini, store.clone(), store)
    };

    Ok(engine.with_max_award_retries(config.progression.max_award_retries))
}
