//! Session state machine
//!
//! ```text
//! Idle ──start──▶ Active ──solved / exhausted──▶ Resolved
//!                   ▲                               │
//!                   └───────────start───────────────┘
//! ```
//!
//! A session is a plain value. Transitions validate first and only then
//! mutate, so a rejected call leaves the session exactly as it was.

use serde::{Deserialize, Serialize};

use super::ledger::Award;
use crate::domain::{PuzzleContent, PuzzleKind};
use crate::error::{ProgressionError, Result};

/// Wrong riddle answers allowed before the answer is revealed
pub const MAX_RIDDLE_ATTEMPTS: u32 = 3;

/// Coarse lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No content requested yet
    Idle,
    /// Content loaded, not yet resolved
    Active,
    /// Terminal: solved or attempts exhausted
    Resolved,
}

/// Result of a single answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Correct answer, points are due
    Solved,
    /// Wrong answer, the session stays active
    Retry,
    /// Riddle attempts used up, answer revealed, no points
    Exhausted,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solved => "solved",
            Self::Retry => "retry",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Answer oracle verdict for challenge answers (no partial credit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

/// The in-progress state of one user's puzzle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Unique per started session, empty while idle
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub started_at: Option<i64>,
    pub content: Option<PuzzleContent>,
    /// Wrong riddle answers so far (unused for challenges)
    pub attempts_made: u32,
    /// Monotonic within a session
    pub hint_revealed: bool,
    /// Monotonic within a session
    pub resolved: bool,
    #[serde(default)]
    pub outcome: Option<Outcome>,
    /// Set once the award for a solved session reached the ledger
    #[serde(default)]
    pub awarded: bool,
}

impl SessionState {
    /// A session with no content
    pub fn idle() -> Self {
        Self::default()
    }

    /// Fresh active session for new content, replacing whatever came before
    pub fn start(content: PuzzleContent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Some(chrono::Utc::now().timestamp_millis()),
            content: Some(content),
            attempts_made: 0,
            hint_revealed: false,
            resolved: false,
            outcome: None,
            awarded: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.content, self.resolved) {
            (None, _) => SessionPhase::Idle,
            (Some(_), false) => SessionPhase::Active,
            (Some(_), true) => SessionPhase::Resolved,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == SessionPhase::Active
    }

    pub fn kind(&self) -> Option<PuzzleKind> {
        self.content.as_ref().map(|c| c.kind)
    }

    /// Content of an active session, or `InvalidInput`
    pub fn active_content(&self) -> Result<&PuzzleContent> {
        match self.phase() {
            SessionPhase::Idle => Err(ProgressionError::invalid("no puzzle has been requested")),
            SessionPhase::Resolved => Err(ProgressionError::invalid("puzzle is already resolved")),
            SessionPhase::Active => self
                .content
                .as_ref()
                .ok_or_else(|| ProgressionError::invalid("no puzzle has been requested")),
        }
    }

    /// Reveal the hint. Calling it again is a no-op.
    pub fn reveal_hint(&mut self) -> Result<&str> {
        self.active_content()?;
        self.hint_revealed = true;
        Ok(self.content.as_ref().map(|c| c.hint.as_str()).unwrap_or_default())
    }

    /// Check a riddle answer against the reference
    ///
    /// Comparison is an exact match after normalization (case, surrounding
    /// and repeated whitespace). No fuzzy matching.
    pub fn submit_riddle_answer(&mut self, answer: &str) -> Result<Outcome> {
        let content = self.active_content()?;
        if content.kind != PuzzleKind::Riddle {
            return Err(ProgressionError::invalid(
                "challenge answers must be judged by the oracle",
            ));
        }
        let answer = non_empty_answer(answer)?;

        let outcome = if normalize_answer(answer) == normalize_answer(&content.answer) {
            Outcome::Solved
        } else {
            self.attempts_made += 1;
            if self.attempts_made >= MAX_RIDDLE_ATTEMPTS {
                Outcome::Exhausted
            } else {
                Outcome::Retry
            }
        };

        self.record(outcome);
        Ok(outcome)
    }

    /// Question and reference solution to hand to the oracle
    ///
    /// Validates the submission without changing the session.
    pub fn challenge_submission<'a>(&'a self, answer: &'a str) -> Result<ChallengeSubmission<'a>> {
        let content = self.active_content()?;
        if content.kind != PuzzleKind::Challenge {
            return Err(ProgressionError::invalid(
                "riddle answers are checked locally",
            ));
        }
        Ok(ChallengeSubmission {
            question: &content.question,
            reference_solution: &content.answer,
            answer: non_empty_answer(answer)?,
        })
    }

    /// Apply the oracle's verdict to a challenge. Retries are unlimited.
    pub fn apply_verdict(&mut self, verdict: Verdict) -> Result<Outcome> {
        let content = self.active_content()?;
        if content.kind != PuzzleKind::Challenge {
            return Err(ProgressionError::invalid("verdicts only apply to challenges"));
        }

        let outcome = match verdict {
            Verdict::Correct => Outcome::Solved,
            Verdict::Incorrect => Outcome::Retry,
        };
        self.record(outcome);
        Ok(outcome)
    }

    fn record(&mut self, outcome: Outcome) {
        if outcome != Outcome::Retry {
            self.resolved = true;
        }
        self.outcome = Some(outcome);
    }

    /// Riddle attempts left (None for challenges or when idle)
    pub fn attempts_remaining(&self) -> Option<u32> {
        match self.kind()? {
            PuzzleKind::Riddle => Some(MAX_RIDDLE_ATTEMPTS.saturating_sub(self.attempts_made)),
            PuzzleKind::Challenge => None,
        }
    }

    /// Correctness reference, surfaced only once the session is resolved
    pub fn revealed_answer(&self) -> Option<&str> {
        if self.resolved {
            self.content.as_ref().map(|c| c.answer.as_str())
        } else {
            None
        }
    }

    /// Solved but the award has not been applied yet
    pub fn award_pending(&self) -> bool {
        self.outcome == Some(Outcome::Solved) && !self.awarded
    }

    /// Award owed for this session, if it was solved
    pub fn award(&self) -> Option<Award> {
        match (self.outcome, &self.content) {
            (Some(Outcome::Solved), Some(content)) => {
                Some(Award::for_solve(self.hint_revealed, &content.topics))
            }
            _ => None,
        }
    }
}

/// Borrowed view of a challenge answer awaiting a verdict
#[derive(Debug, Clone, Copy)]
pub struct ChallengeSubmission<'a> {
    pub question: &'a str,
    pub reference_solution: &'a str,
    pub answer: &'a str,
}

fn non_empty_answer(answer: &str) -> Result<&str> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        Err(ProgressionError::invalid("answer is empty"))
    } else {
        Ok(trimmed)
    }
}

/// Lower-case and collapse whitespace
pub fn normalize_answer(s: &str) -> String {
    s.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
