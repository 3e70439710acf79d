//! Progress ledger and point awards

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ranks::{Rank, RankStanding};
use crate::domain::TopicId;

/// Points for various outcomes
pub struct PointRewards;

impl PointRewards {
    /// Solved without revealing the hint
    pub const SOLVED: u32 = 3;

    /// Solved after revealing the hint
    pub const SOLVED_WITH_HINT: u32 = 1;

    pub fn for_solve(hint_revealed: bool) -> u32 {
        if hint_revealed {
            Self::SOLVED_WITH_HINT
        } else {
            Self::SOLVED
        }
    }
}

/// A single increment-style update to a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub points: u32,
    /// Whether the hint was revealed before solving
    pub hint_used: bool,
    /// Every topic credited by this award, primary first
    pub topics: Vec<TopicId>,
}

impl Award {
    /// Award for a solved puzzle
    pub fn for_solve(hint_revealed: bool, topics: &[TopicId]) -> Self {
        let mut credited = Vec::with_capacity(topics.len());
        for topic in topics {
            if !credited.contains(topic) {
                credited.push(*topic);
            }
        }
        Self {
            points: PointRewards::for_solve(hint_revealed),
            hint_used: hint_revealed,
            topics: credited,
        }
    }
}

/// A user's cumulative progress
///
/// `version` advances by one with every applied award. Stores use it to
/// refuse an award computed against a stale copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressLedger {
    pub total_points: u32,
    pub solved_count: u32,
    /// Never exceeds `solved_count`
    pub solved_without_hint_count: u32,
    /// Only topics credited at least once appear here
    pub topic_progress: BTreeMap<TopicId, u32>,
    pub version: u64,
}

impl ProgressLedger {
    /// All-zero ledger for a user seen for the first time
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an award in full and advance the version
    pub fn apply(&mut self, award: &Award) {
        self.total_points = self.total_points.saturating_add(award.points);
        self.solved_count = self.solved_count.saturating_add(1);
        if !award.hint_used {
            self.solved_without_hint_count = self.solved_without_hint_count.saturating_add(1);
        }
        for topic in &award.topics {
            *self.topic_progress.entry(*topic).or_insert(0) += 1;
        }
        self.version += 1;
    }

    /// Copy of this ledger with the award applied
    pub fn with_award(&self, award: &Award) -> Self {
        let mut next = self.clone();
        next.apply(award);
        next
    }

    /// Current rank, always recomputed from the points
    pub fn rank(&self) -> RankStanding {
        Rank::for_points(self.total_points)
    }

    /// Number of topics credited at least once
    pub fn topics_covered(&self) -> usize {
        self.topic_progress.values().filter(|&&count| count > 0).count()
    }

    pub fn topic_count(&self, topic: TopicId) -> u32 {
        self.topic_progress.get(&topic).copied().unwrap_or(0)
    }
}
