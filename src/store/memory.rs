//! In-process store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{LedgerStore, SessionStore};
use crate::domain::UserId;
use crate::error::{ProgressionError, Result};
use crate::progression::{Award, ProgressLedger, SessionState};

#[derive(Default)]
struct MemoryState {
    ledgers: HashMap<UserId, ProgressLedger>,
    sessions: HashMap<UserId, SessionState>,
}

/// Ledger and session store held in memory
///
/// Cloning shares the same underlying state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ProgressionError::Storage("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn load_ledger(&self, user: &UserId) -> Result<ProgressLedger> {
        let mut state = self.lock()?;
        Ok(state.ledgers.entry(user.clone()).or_default().clone())
    }

    async fn apply_award(
        &self,
        user: &UserId,
        award: &Award,
        expected_version: u64,
    ) -> Result<ProgressLedger> {
        let mut state = self.lock()?;
        let ledger = state.ledgers.entry(user.clone()).or_default();
        if ledger.version != expected_version {
            return Err(ProgressionError::VersionConflict {
                expected: expected_version,
                actual: ledger.version,
            });
        }
        ledger.apply(award);
        Ok(ledger.clone())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_session(&self, user: &UserId) -> Result<Option<SessionState>> {
        Ok(self.lock()?.sessions.get(user).cloned())
    }

    async fn save_session(&self, user: &UserId, session: &SessionState) -> Result<()> {
        self.lock()?.sessions.insert(user.clone(), session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TopicId;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    fn award() -> Award {
        Award::for_solve(false, &[TopicId::new(3).unwrap()])
    }

    #[tokio::test]
    async fn test_unknown_user_gets_zero_ledger() {
        let store = MemoryStore::new();
        assert_eq!(store.load_ledger(&user()).await.unwrap(), ProgressLedger::new());
    }

    #[tokio::test]
    async fn test_stale_version_rejected() {
        let store = MemoryStore::new();
        store.apply_award(&user(), &award(), 0).await.unwrap();

        let err = store.apply_award(&user(), &award(), 0).await.unwrap_err();
        assert_eq!(err, ProgressionError::VersionConflict { expected: 0, actual: 1 });

        let ledger = store.load_ledger(&user()).await.unwrap();
        assert_eq!(ledger.total_points, 3);
        assert_eq!(ledger.version, 1);
    }

    #[tokio::test]
    async fn test_session_replaced() {
        let store = MemoryStore::new();
        assert!(store.load_session(&user()).await.unwrap().is_none());

        let mut session = SessionState::idle();
        session.attempts_made = 2;
        store.save_session(&user(), &session).await.unwrap();
        store.save_session(&user(), &SessionState::idle()).await.unwrap();

        let loaded = store.load_session(&user()).await.unwrap().unwrap();
        assert_eq!(loaded.attempts_made, 0);
    }
}
