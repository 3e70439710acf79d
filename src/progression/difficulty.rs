//! Difficulty scaling
//!
//! Independent of the rank table on purpose: the two scales share a
//! number (200) today but are not derived from one another.

use crate::domain::Difficulty;

/// Points at which puzzles move from easy to medium
pub const MEDIUM_THRESHOLD: u32 = 50;

/// Points at which puzzles move from medium to hard
pub const HARD_THRESHOLD: u32 = 200;

/// Map cumulative points to the tier requested from the generator
pub fn difficulty_for(points: u32) -> Difficulty {
    if points < MEDIUM_THRESHOLD {
        Difficulty::Easy
    } else if points < HARD_THRESHOLD {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
