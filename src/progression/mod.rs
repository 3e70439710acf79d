//! Progression core: ranks, difficulty, ledger, sessions and the engine
//! that connects them.

mod aptitude;
mod difficulty;
mod engine;
mod ledger;
mod ranks;
mod session;

pub use aptitude::{aptitude_score, APTITUDE_CAP};
pub use difficulty::{difficulty_for, HARD_THRESHOLD, MEDIUM_THRESHOLD};
pub use engine::{
    resolve_outcome, ProfileView, ProgressionEngine, RankUp, Settlement, SubmitReport,
    DEFAULT_MAX_AWARD_RETRIES,
};
pub use ledger::{Award, PointRewards, ProgressLedger};
pub use ranks::{Rank, RankStanding, RANKS};
pub use session::{
    normalize_answer, ChallengeSubmission, Outcome, SessionPhase, SessionState, Verdict,
    MAX_RIDDLE_ATTEMPTS,
};
