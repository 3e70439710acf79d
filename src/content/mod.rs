//! External content collaborators
//!
//! The core only needs two things from the outside world: something that
//! produces puzzles, and something that judges free-form challenge answers.
//! Both are async because both usually sit behind a network call.

mod gemini;
mod prompts;

pub use gemini::GeminiClient;
pub use prompts::{challenge_prompt, judge_prompt, riddle_prompt};

use async_trait::async_trait;

use crate::domain::{Difficulty, PuzzleContent, PuzzleKind, TopicId};
use crate::error::Result;
use crate::progression::Verdict;

/// Produces puzzle content for a requested tier
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a puzzle
    ///
    /// # Arguments
    /// * `kind` - Riddle or challenge
    /// * `tier` - Difficulty the content must be tagged with
    /// * `topic` - Primary topic, if the caller picked one
    ///
    /// Fails with `ContentUnavailable` on missing or malformed output.
    async fn generate_puzzle(
        &self,
        kind: PuzzleKind,
        tier: Difficulty,
        topic: Option<TopicId>,
    ) -> Result<PuzzleContent>;
}

/// Judges challenge answers by meaning rather than wording
#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// Fails with `OracleUnavailable` if no verdict could be obtained
    async fn judge(&self, question: &str, reference_solution: &str, answer: &str)
    -> Result<Verdict>;
}
