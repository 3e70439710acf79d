//! Concurrent awards against one ledger

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Barrier;

use common::{ScriptedGenerator, ScriptedOracle, puzzle, user};
use ecoquest::domain::{Difficulty, PuzzleKind, UserId};
use ecoquest::progression::{Award, Outcome, ProgressLedger, ProgressionEngine, SessionState};
use ecoquest::store::{LedgerStore, MemoryStore, SessionStore};
use ecoquest::{ProgressionError, Result};

/// Holds the first two ledger loads until both have happened, so two
/// awards are computed against the same version
struct RacingStore {
    inner: MemoryStore,
    armed: AtomicBool,
    loads: AtomicUsize,
    barrier: Barrier,
    conflicts: AtomicUsize,
}

impl RacingStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
            barrier: Barrier::new(2),
            conflicts: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl LedgerStore for RacingStore {
    async fn load_ledger(&self, user: &UserId) -> Result<ProgressLedger> {
        let ledger = self.inner.load_ledger(user).await?;
        if self.armed.load(Ordering::SeqCst) && self.loads.fetch_add(1, Ordering::SeqCst) < 2 {
            self.barrier.wait().await;
        }
        Ok(ledger)
    }

    async fn apply_award(
        &self,
        user: &UserId,
        award: &Award,
        expected_version: u64,
    ) -> Result<ProgressLedger> {
        let result = self.inner.apply_award(user, award, expected_version).await;
        if matches!(result, Err(ProgressionError::VersionConflict { .. })) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

/// Rejects the next `remaining` awards as if another writer got there first
struct ContendedStore {
    inner: MemoryStore,
    remaining: AtomicU32,
}

#[async_trait]
impl LedgerStore for ContendedStore {
    async fn load_ledger(&self, user: &UserId) -> Result<ProgressLedger> {
        self.inner.load_ledger(user).await
    }

    async fn apply_award(
        &self,
        user: &UserId,
        award: &Award,
        expected_version: u64,
    ) -> Result<ProgressLedger> {
        let left = self.remaining.load(Ordering::SeqCst);
        if left > 0 {
            self.remaining.store(left - 1, Ordering::SeqCst);
            return Err(ProgressionError::VersionConflict {
                expected: expected_version,
                actual: expected_version + 1,
            });
        }
        self.inner.apply_award(user, award, expected_version).await
    }
}

fn solved_ready_session() -> SessionState {
    SessionState::start(puzzle(PuzzleKind::Riddle, Difficulty::Easy, "compost", &[13]))
}

fn engine_over(ledgers: Arc<dyn LedgerStore>, sessions: &MemoryStore) -> ProgressionEngine {
    ProgressionEngine::new(
        Arc::new(ScriptedGenerator::new("compost", &[13])),
        Arc::new(ScriptedOracle::default()),
        ledgers,
        Arc::new(sessions.clone()),
    )
}

#[tokio::test]
async fn test_concurrent_awards_both_land() {
    let memory = MemoryStore::new();
    let racing = Arc::new(RacingStore::new(memory.clone()));
    let engine = engine_over(racing.clone(), &memory);
    let alice = user("alice");

    let mut phone = solved_ready_session();
    let mut laptop = solved_ready_session();
    racing.armed.store(true, Ordering::SeqCst);

    let (a, b) = futures::join!(
        engine.submit_answer(&alice, &mut phone, "compost"),
        engine.submit_answer(&alice, &mut laptop, "compost"),
    );
    assert_eq!(a.unwrap().points_awarded, 3);
    assert_eq!(b.unwrap().points_awarded, 3);

    let ledger = memory.load_ledger(&alice).await.unwrap();
    assert_eq!(ledger.total_points, 6);
    assert_eq!(ledger.solved_count, 2);
    assert_eq!(ledger.version, 2);
    assert_eq!(racing.conflicts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_awards_across_tasks() {
    let memory = MemoryStore::new();
    let racing = Arc::new(RacingStore::new(memory.clone()));
    let engine = engine_over(racing.clone(), &memory);
    racing.armed.store(true, Ordering::SeqCst);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let alice = user("alice");
                let mut session = solved_ready_session();
                engine.submit_answer(&alice, &mut session, "compost").await
            })
        })
        .collect();

    for handle in handles {
        let report = handle.await.unwrap().unwrap();
        assert_eq!(report.outcome, Outcome::Solved);
    }

    let ledger = memory.load_ledger(&user("alice")).await.unwrap();
    assert_eq!(ledger.total_points, 6);
    assert_eq!(racing.conflicts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_award_retries_within_budget() {
    let memory = MemoryStore::new();
    let contended = Arc::new(ContendedStore {
        inner: memory.clone(),
        remaining: AtomicU32::new(3),
    });
    let engine = engine_over(contended, &memory).with_max_award_retries(3);
    let alice = user("alice");

    let mut session = solved_ready_session();
    let report = engine.submit_answer(&alice, &mut session, "compost").await.unwrap();
    assert_eq!(report.points_awarded, 3);
    assert_eq!(memory.load_ledger(&alice).await.unwrap().total_points, 3);
}

#[tokio::test]
async fn test_exhausted_retries_keep_award_pending() {
    let memory = MemoryStore::new();
    let contended = Arc::new(ContendedStore {
        inner: memory.clone(),
        remaining: AtomicU32::new(2),
    });
    let engine = engine_over(contended, &memory).with_max_award_retries(1);
    let alice = user("alice");

    let mut session = solved_ready_session();
    let err = engine.submit_answer(&alice, &mut session, "compost").await.unwrap_err();
    assert!(err.is_conflict());
    assert!(session.award_pending());
    assert_eq!(memory.load_ledger(&alice).await.unwrap().total_points, 0);

    // The solved session was persisted, so the award can be settled later
    let mut stored = memory.load_session(&alice).await.unwrap().unwrap();
    assert!(stored.award_pending());

    let settlement = engine.settle(&alice, &mut stored).await.unwrap();
    assert_eq!(settlement.points_awarded, 3);
    assert_eq!(settlement.ledger.total_points, 3);
    assert!(!memory.load_session(&alice).await.unwrap().unwrap().award_pending());
}

#[tokio::test]
async fn test_pending_award_settled_before_next_puzzle() {
    let memory = MemoryStore::new();
    let contended = Arc::new(ContendedStore {
        inner: memory.clone(),
        remaining: AtomicU32::new(2),
    });
    let engine = engine_over(contended, &memory).with_max_award_retries(1);
    let alice = user("alice");

    let mut session = solved_ready_session();
    let err = engine.submit_answer(&alice, &mut session, "compost").await.unwrap_err();
    assert!(err.is_conflict());
    assert!(memory.load_session(&alice).await.unwrap().unwrap().award_pending());

    // Switching to a challenge must not discard the solved riddle's points
    let next = engine
        .request_session(&alice, PuzzleKind::Challenge, None)
        .await
        .unwrap();
    assert!(next.is_active());

    let ledger = memory.load_ledger(&alice).await.unwrap();
    assert_eq!(ledger.total_points, 3);
    assert_eq!(ledger.solved_count, 1);
    assert_eq!(memory.load_session(&alice).await.unwrap().unwrap().id, next.id);
}

#[tokio::test]
async fn test_failed_settle_keeps_pending_session() {
    let memory = MemoryStore::new();
    let contended = Arc::new(ContendedStore {
        inner: memory.clone(),
        remaining: AtomicU32::new(4),
    });
    let engine = engine_over(contended, &memory).with_max_award_retries(1);
    let alice = user("alice");

    let mut session = solved_ready_session();
    engine.submit_answer(&alice, &mut session, "compost").await.unwrap_err();

    let err = engine
        .request_session(&alice, PuzzleKind::Riddle, None)
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    let stored = memory.load_session(&alice).await.unwrap().unwrap();
    assert_eq!(stored.id, session.id);
    assert!(stored.award_pending());
    assert_eq!(memory.load_ledger(&alice).await.unwrap().total_points, 0);

    // Contention gone: the award lands exactly once, then a new puzzle starts
    let next = engine.request_session(&alice, PuzzleKind::Riddle, None).await.unwrap();
    assert_ne!(next.id, session.id);
    assert_eq!(memory.load_ledger(&alice).await.unwrap().total_points, 3);

    let again = engine.request_session(&alice, PuzzleKind::Riddle, None).await.unwrap();
    assert_ne!(again.id, next.id);
    assert_eq!(memory.load_ledger(&alice).await.unwrap().total_points, 3);
}
