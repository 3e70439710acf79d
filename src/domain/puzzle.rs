//! Puzzle content produced by the external generator
//!
//! The core treats these fields as data. It never computes an answer,
//! it only checks that the payload is usable for the tier it asked for.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::topic::TopicId;
use crate::error::{ProgressionError, Result};

/// Most topics a single puzzle may be tagged with
pub const MAX_TOPICS_PER_PUZZLE: usize = 3;

/// Which kind of point-earning attempt a session holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleKind {
    /// Short answer, checked by normalized string match, three attempts
    Riddle,
    /// Free-form answer, judged by the oracle, unlimited attempts
    Challenge,
}

impl PuzzleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Riddle => "riddle",
            Self::Challenge => "challenge",
        }
    }
}

impl fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier requested from the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Case-insensitive parse of the generator's difficulty tag
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only extras that accompany a puzzle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDetails {
    /// Interesting fact related to the answer (riddles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    /// "Did you know?" trivia (riddles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_you_know: Option<String>,
    /// Why the topic matters (riddles)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    /// Why the reference solution works (challenges)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A generated puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleContent {
    pub kind: PuzzleKind,
    pub question: String,
    /// Correctness reference: the riddle answer or the challenge's reference solution
    pub answer: String,
    pub hint: String,
    pub difficulty: Difficulty,
    /// Primary topic first, then up to two related ones
    pub topics: Vec<TopicId>,
    #[serde(default)]
    pub details: PuzzleDetails,
}

/// Wire shape of the generator's JSON payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedPuzzle {
    question: String,
    #[serde(alias = "solution")]
    answer: String,
    #[serde(default)]
    hint: String,
    difficulty: String,
    #[serde(default, alias = "topics")]
    sdgs: Vec<i64>,
    fact: Option<String>,
    did_you_know: Option<String>,
    importance: Option<String>,
    explanation: Option<String>,
}

impl PuzzleContent {
    /// Parse a generator JSON payload
    ///
    /// When `primary` is given it is moved (or inserted) to the front of the
    /// topic list. Duplicate topics are dropped and the list is cut to
    /// `MAX_TOPICS_PER_PUZZLE`. Anything that cannot be
    /// turned into a puzzle is `ContentUnavailable`.
    pub fn from_generator_json(
        kind: PuzzleKind,
        json: &str,
        primary: Option<TopicId>,
    ) -> Result<Self> {
        let raw: GeneratedPuzzle = serde_json::from_str(json).map_err(|e| {
            ProgressionError::ContentUnavailable(format!("unparsable {} payload: {}", kind, e))
        })?;

        let difficulty = Difficulty::parse(&raw.difficulty).ok_or_else(|| {
            ProgressionError::ContentUnavailable(format!(
                "unknown difficulty tag '{}'",
                raw.difficulty
            ))
        })?;

        let mut topics = Vec::with_capacity(raw.sdgs.len() + 1);
        if let Some(primary) = primary {
            topics.push(primary);
        }
        for id in raw.sdgs {
            let topic = TopicId::from_i64(id).map_err(|_| {
                ProgressionError::ContentUnavailable(format!("topic id {} is out of range", id))
            })?;
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics.truncate(MAX_TOPICS_PER_PUZZLE);

        Ok(Self {
            kind,
            question: raw.question,
            answer: raw.answer,
            hint: raw.hint,
            difficulty,
            topics,
            details: PuzzleDetails {
                fact: raw.fact,
                did_you_know: raw.did_you_know,
                importance: raw.importance,
                explanation: raw.explanation,
            },
        })
    }

    /// Check the payload is usable for a session requested at `tier`
    pub fn validate(&self, kind: PuzzleKind, tier: Difficulty) -> Result<()> {
        let malformed = |msg: String| Err(ProgressionError::ContentUnavailable(msg));

        if self.kind != kind {
            return malformed(format!("expected a {} but got a {}", kind, self.kind));
        }
        if self.question.trim().is_empty() {
            return malformed("question is empty".to_string());
        }
        if self.answer.trim().is_empty() {
            return malformed("correctness reference is empty".to_string());
        }
        if self.topics.is_empty() || self.topics.len() > MAX_TOPICS_PER_PUZZLE {
            return malformed(format!(
                "expected 1..={} topics, got {}",
                MAX_TOPICS_PER_PUZZLE,
                self.topics.len()
            ));
        }
        if self.difficulty != tier {
            return malformed(format!(
                "requested {} content but got {}",
                tier, self.difficulty
            ));
        }
        Ok(())
    }

    /// The primary topic (first in the list)
    pub fn primary_topic(&self) -> Option<TopicId> {
        self.topics.first().copied()
    }

    /// Topics other than the primary one
    pub fn related_topics(&self) -> &[TopicId] {
        self.topics.get(1..).unwrap_or(&[])
    }
}
