//! EcoQuest - sustainability riddles and challenges with a points ladder
//!
//! Players earn points by solving generated puzzles about the UN
//! Sustainable Development Goals. Points raise their rank and, past fixed
//! thresholds, the difficulty of what they are asked next.
//!
//! ## Puzzle Kinds
//!
//! 1. **Riddles**: short answers, checked by normalized string match, three
//!    attempts before the answer is revealed with no points.
//!
//! 2. **Challenges**: free-form answers judged by an external oracle,
//!    unlimited attempts.
//!
//! Solving earns 3 points, or 1 if the hint was revealed first.

pub mod config;
pub mod content;
pub mod domain;
pub mod error;
pub mod progression;
pub mod store;

pub use error::{ProgressionError, Result};
