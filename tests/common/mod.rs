//! Shared test doubles for progression integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ecoquest::content::{AnswerOracle, ContentGenerator};
use ecoquest::domain::{Difficulty, PuzzleContent, PuzzleDetails, PuzzleKind, TopicId, UserId};
use ecoquest::progression::{Award, ProgressionEngine, Verdict};
use ecoquest::store::{LedgerStore, MemoryStore};
use ecoquest::{ProgressionError, Result};

pub fn topics(ids: &[u8]) -> Vec<TopicId> {
    ids.iter().map(|&id| TopicId::new(id).unwrap()).collect()
}

pub fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

/// Content with the given kind, tier and topics
pub fn puzzle(kind: PuzzleKind, tier: Difficulty, answer: &str, topic_ids: &[u8]) -> PuzzleContent {
    PuzzleContent {
        kind,
        question: format!("A {} question", kind),
        answer: answer.to_string(),
        hint: "Think about what goes back into the soil".to_string(),
        difficulty: tier,
        topics: topics(topic_ids),
        details: PuzzleDetails {
            fact: Some("Food waste makes up a large share of landfill".to_string()),
            ..Default::default()
        },
    }
}

/// Generator that always answers at the requested tier
///
/// Records every request and can be switched into a failing mode.
pub struct ScriptedGenerator {
    answer: String,
    topic_ids: Vec<u8>,
    failing: AtomicBool,
    requests: Mutex<Vec<(PuzzleKind, Difficulty, Option<TopicId>)>>,
}

impl ScriptedGenerator {
    pub fn new(answer: &str, topic_ids: &[u8]) -> Self {
        Self {
            answer: answer.to_string(),
            topic_ids: topic_ids.to_vec(),
            failing: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<(PuzzleKind, Difficulty, Option<TopicId>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate_puzzle(
        &self,
        kind: PuzzleKind,
        tier: Difficulty,
        topic: Option<TopicId>,
    ) -> Result<PuzzleContent> {
        self.requests.lock().unwrap().push((kind, tier, topic));
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProgressionError::ContentUnavailable(
                "generator returned no text".to_string(),
            ));
        }
        Ok(puzzle(kind, tier, &self.answer, &self.topic_ids))
    }
}

/// Generator that returns one fixed payload regardless of the request
pub struct FixedGenerator(pub PuzzleContent);

#[async_trait]
impl ContentGenerator for FixedGenerator {
    async fn generate_puzzle(
        &self,
        _kind: PuzzleKind,
        _tier: Difficulty,
        _topic: Option<TopicId>,
    ) -> Result<PuzzleContent> {
        Ok(self.0.clone())
    }
}

/// Oracle that plays back queued verdicts, then answers `Incorrect`
#[derive(Default)]
pub struct ScriptedOracle {
    verdicts: Mutex<VecDeque<Result<Verdict>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(verdicts: Vec<Result<Verdict>>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers passed to `judge`, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerOracle for ScriptedOracle {
    async fn judge(
        &self,
        _question: &str,
        _reference_solution: &str,
        answer: &str,
    ) -> Result<Verdict> {
        self.calls.lock().unwrap().push(answer.to_string());
        self.verdicts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Verdict::Incorrect))
    }
}

pub fn engine(
    generator: Arc<dyn ContentGenerator>,
    oracle: Arc<dyn AnswerOracle>,
    store: &MemoryStore,
) -> ProgressionEngine {
    let store = Arc::new(store.clone());
    ProgressionEngine::new(generator, oracle, store.clone(), store)
}

/// Put `points` on a user's ledger without any topic or solve credit
pub async fn seed_points(store: &dyn LedgerStore, user: &UserId, points: u32) {
    let ledger = store.load_ledger(user).await.unwrap();
    let award = Award {
        points,
        hint_used: true,
        topics: Vec::new(),
    };
    store.apply_award(user, &award, ledger.version).await.unwrap();
}
