//! Progression engine - drives sessions and turns solves into awards
//!
//! Session transitions are pure (see `session`). The engine adds the
//! collaborators around them: content generation, oracle judging, ledger
//! awards with version checks, and session persistence.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::aptitude::aptitude_score;
use super::difficulty::difficulty_for;
use super::ledger::ProgressLedger;
use super::ranks::{Rank, RankStanding};
use super::session::{Outcome, SessionPhase, SessionState};
use crate::content::{AnswerOracle, ContentGenerator};
use crate::domain::{PuzzleKind, TopicId, UserId};
use crate::error::{ProgressionError, Result};
use crate::store::{LedgerStore, SessionStore};

/// Default number of reload-and-retry rounds after a version conflict
pub const DEFAULT_MAX_AWARD_RETRIES: u32 = 5;

/// A rank boundary was crossed by an award
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankUp {
    pub from: &'static Rank,
    pub to: &'static Rank,
}

impl RankUp {
    pub fn between(old_points: u32, new_points: u32) -> Option<Self> {
        let from = Rank::for_points(old_points).current;
        let to = Rank::for_points(new_points).current;
        if to.min_points > from.min_points {
            Some(Self { from, to })
        } else {
            None
        }
    }
}

/// Result of applying a solved session's award to the ledger
#[derive(Debug, Clone)]
pub struct Settlement {
    pub points_awarded: u32,
    pub ledger: ProgressLedger,
    pub rank_up: Option<RankUp>,
}

/// What happened after one answer submission
#[derive(Debug, Clone)]
pub struct SubmitReport {
    pub outcome: Outcome,
    /// Zero unless the session was solved
    pub points_awarded: u32,
    /// Updated ledger when points were awarded
    pub ledger: Option<ProgressLedger>,
    pub rank_up: Option<RankUp>,
    /// Correctness reference once the session is resolved
    pub revealed_answer: Option<String>,
    /// Riddle attempts left (None for challenges)
    pub attempts_remaining: Option<u32>,
}

/// Everything a profile screen shows
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub ledger: ProgressLedger,
    pub standing: RankStanding,
    /// Clamped to 0.0..=1.0
    pub progress_fraction: f64,
    pub aptitude: u32,
}

impl ProfileView {
    pub fn from_ledger(ledger: ProgressLedger) -> Self {
        let standing = ledger.rank();
        Self {
            progress_fraction: standing.progress_fraction(),
            aptitude: aptitude_score(&ledger),
            standing,
            ledger,
        }
    }
}

/// Points due for a session and the ledger as it looks once they are applied
///
/// Only a solved session earns anything. Exhausted or unresolved sessions
/// award zero and leave the ledger untouched.
pub fn resolve_outcome(session: &SessionState, ledger: &ProgressLedger) -> (u32, ProgressLedger) {
    match session.award() {
        Some(award) => (award.points, ledger.with_award(&award)),
        None => (0, ledger.clone()),
    }
}

/// Orchestrates sessions, awards and persistence for any number of users
#[derive(Clone)]
pub struct ProgressionEngine {
    generator: Arc<dyn ContentGenerator>,
    oracle: Arc<dyn AnswerOracle>,
    ledgers: Arc<dyn LedgerStore>,
    sessions: Arc<dyn SessionStore>,
    max_award_retries: u32,
}

impl ProgressionEngine {
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        oracle: Arc<dyn AnswerOracle>,
        ledgers: Arc<dyn LedgerStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            generator,
            oracle,
            ledgers,
            sessions,
            max_award_retries: DEFAULT_MAX_AWARD_RETRIES,
        }
    }

    pub fn with_max_award_retries(mut self, retries: u32) -> Self {
        self.max_award_retries = retries;
        self
    }

    /// Start a new session at the tier the user's points call for
    ///
    /// A stored session still owed its award is settled first; if that
    /// fails the error is returned and the stored session is kept. On any
    /// failure the previous session stays valid.
    pub async fn request_session(
        &self,
        user: &UserId,
        kind: PuzzleKind,
        topic: Option<TopicId>,
    ) -> Result<SessionState> {
        let pending = self
            .sessions
            .load_session(user)
            .await?
            .filter(SessionState::award_pending);
        if let Some(mut previous) = pending {
            info!(%user, session = %previous.id, "Settling pending award before new puzzle");
            self.settle(user, &mut previous).await?;
        }

        let ledger = self.ledgers.load_ledger(user).await?;
        let tier = difficulty_for(ledger.total_points);
        debug!(%user, %kind, %tier, points = ledger.total_points, "Requesting new puzzle");

        let content = self
            .generator
            .generate_puzzle(kind, tier, topic)
            .await
            .inspect_err(|e| warn!(%user, "Puzzle generation failed: {}", e))?;
        content.validate(kind, tier)?;

        let session = SessionState::start(content);
        self.sessions.save_session(user, &session).await?;
        info!(%user, session = %session.id, %kind, %tier, "Session started");
        Ok(session)
    }

    /// The user's stored session, if one was ever started
    pub async fn resume_session(&self, user: &UserId) -> Result<Option<SessionState>> {
        let session = self.sessions.load_session(user).await?;
        Ok(session.filter(|s| s.phase() != SessionPhase::Idle))
    }

    /// Reveal the hint and persist that it was used
    pub async fn reveal_hint(&self, user: &UserId, session: &mut SessionState) -> Result<String> {
        let already = session.hint_revealed;
        let hint = session.reveal_hint()?.to_string();
        if !already {
            self.sessions.save_session(user, session).await?;
            debug!(%user, session = %session.id, "Hint revealed");
        }
        Ok(hint)
    }

    /// Submit an answer and settle any award it earns
    ///
    /// Riddles are checked locally. Challenges go to the oracle; if it is
    /// unreachable the session is left unresolved so the user can resubmit.
    pub async fn submit_answer(
        &self,
        user: &UserId,
        session: &mut SessionState,
        answer: &str,
    ) -> Result<SubmitReport> {
        let kind = session.active_content()?.kind;

        let outcome = match kind {
            PuzzleKind::Riddle => session.submit_riddle_answer(answer)?,
            PuzzleKind::Challenge => {
                let verdict = {
                    let submission = session.challenge_submission(answer)?;
                    self.oracle
                        .judge(
                            submission.question,
                            submission.reference_solution,
                            submission.answer,
                        )
                        .await
                        .inspect_err(|e| warn!(%user, "Answer judging failed: {}", e))?
                };
                session.apply_verdict(verdict)?
            }
        };
        debug!(%user, session = %session.id, outcome = outcome.as_str(), "Answer submitted");

        let settlement = match outcome {
            Outcome::Solved => Some(self.apply_award_with_retry(user, session).await),
            Outcome::Retry | Outcome::Exhausted => None,
        };

        // Persist before surfacing any award error so a pending award survives
        self.persist_session(user, session).await?;

        let settlement = settlement.transpose()?;
        if outcome == Outcome::Exhausted {
            info!(%user, session = %session.id, "Riddle attempts exhausted, no points");
        }

        Ok(SubmitReport {
            outcome,
            points_awarded: settlement.as_ref().map_or(0, |s| s.points_awarded),
            rank_up: settlement.as_ref().and_then(|s| s.rank_up.clone()),
            ledger: settlement.map(|s| s.ledger),
            revealed_answer: session.revealed_answer().map(str::to_string),
            attempts_remaining: session.attempts_remaining(),
        })
    }

    /// Apply a pending award (e.g. one that lost every retry earlier) and
    /// persist the session
    pub async fn settle(&self, user: &UserId, session: &mut SessionState) -> Result<Settlement> {
        let settlement = self.apply_award_with_retry(user, session).await?;
        self.persist_session(user, session).await?;
        Ok(settlement)
    }

    /// Save a session, retrying once
    ///
    /// Used after awards: a stale stored session would still look unsettled.
    async fn persist_session(&self, user: &UserId, session: &SessionState) -> Result<()> {
        if let Err(e) = self.sessions.save_session(user, session).await {
            warn!(%user, session = %session.id, "Saving session failed, retrying: {}", e);
            self.sessions
                .save_session(user, session)
                .await
                .inspect_err(|e| {
                    error!(
                        %user,
                        session = %session.id,
                        awarded = session.awarded,
                        "Session not saved, stored copy is stale: {}",
                        e
                    )
                })?;
        }
        Ok(())
    }

    /// Apply the award owed by a solved session
    ///
    /// Each round loads the ledger, computes the award and applies it against
    /// the loaded version. A lost race reloads and tries again, up to
    /// `max_award_retries` times, after which the conflict is returned. The
    /// session is marked awarded only once the ledger accepted the award.
    async fn apply_award_with_retry(
        &self,
        user: &UserId,
        session: &mut SessionState,
    ) -> Result<Settlement> {
        if session.awarded {
            return Err(ProgressionError::invalid("award for this session was already applied"));
        }
        let award = session
            .award()
            .ok_or_else(|| ProgressionError::invalid("session has not been solved"))?;

        let mut retries = 0;
        loop {
            let ledger = self.ledgers.load_ledger(user).await?;
            let points = award.points;

            match self.ledgers.apply_award(user, &award, ledger.version).await {
                Ok(updated) => {
                    session.awarded = true;
                    let rank_up = RankUp::between(ledger.total_points, updated.total_points);
                    info!(
                        %user,
                        points,
                        total = updated.total_points,
                        "Award applied"
                    );
                    if let Some(up) = &rank_up {
                        info!(%user, from = up.from.name, to = up.to.name, "Rank up");
                    }
                    return Ok(Settlement {
                        points_awarded: points,
                        ledger: updated,
                        rank_up,
                    });
                }
                Err(e) if e.is_conflict() && retries < self.max_award_retries => {
                    retries += 1;
                    warn!(%user, retries, "Ledger changed underneath award, reloading: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Current ledger with derived rank and aptitude
    pub async fn profile(&self, user: &UserId) -> Result<ProfileView> {
        let ledger = self.ledgers.load_ledger(user).await?;
        Ok(ProfileView::from_ledger(ledger))
    }
}
