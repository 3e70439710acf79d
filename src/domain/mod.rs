//! Core domain types for EcoQuest

mod puzzle;
mod topic;
mod user;

pub use puzzle::{Difficulty, PuzzleContent, PuzzleDetails, PuzzleKind, MAX_TOPICS_PER_PUZZLE};
pub use topic::{TopicId, TopicInfo, TOPICS};
pub use user::UserId;
