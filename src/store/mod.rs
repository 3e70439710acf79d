//! Persistence collaborators for ledgers and sessions
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  ProgressionEngine   │
//! └──────────┬───────────┘
//!            │ load / apply_award(expected_version)
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────────┐
//! │     MemoryStore      │     │     SqliteStore      │
//! │  (tests, ephemeral)  │     │ ~/.ecoquest/progress │
//! └──────────────────────┘     └──────────────────────┘
//! ```
//!
//! Awards are increment-style updates guarded by the ledger version, never
//! a blind overwrite of the whole record.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::domain::UserId;
use crate::error::Result;
use crate::progression::{Award, ProgressLedger, SessionState};

/// Durable home of each user's ledger
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Load a user's ledger. Unknown users get an all-zero ledger.
    async fn load_ledger(&self, user: &UserId) -> Result<ProgressLedger>;

    /// Apply an award atomically if the stored version still equals
    /// `expected_version`, otherwise fail with `VersionConflict`.
    async fn apply_award(
        &self,
        user: &UserId,
        award: &Award,
        expected_version: u64,
    ) -> Result<ProgressLedger>;
}

/// Keeps each user's current session so it survives restarts
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_session(&self, user: &UserId) -> Result<Option<SessionState>>;

    /// Replace the stored session (there is no history)
    async fn save_session(&self, user: &UserId, session: &SessionState) -> Result<()>;
}
