//! Rank table
//!
//! Defines rank thresholds, names and badge colors. Rank is never stored,
//! it is always derived from a ledger's total points.

use serde::Serialize;

/// Rank definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rank {
    pub name: &'static str,
    pub min_points: u32,
    /// Badge color shown next to the rank name
    pub color: &'static str,
}

/// All rank definitions (must be sorted by `min_points`, first entry at 0)
pub static RANKS: &[Rank] = &[
    Rank {
        name: "Sustainability Novice",
        min_points: 0,
        color: "#4CAF50",
    },
    Rank {
        name: "Eco Apprentice",
        min_points: 50,
        color: "#8BC34A",
    },
    Rank {
        name: "Green Guardian",
        min_points: 100,
        color: "#CDDC39",
    },
    Rank {
        name: "Climate Champion",
        min_points: 200,
        color: "#FFEB3B",
    },
    Rank {
        name: "Sustainability Sage",
        min_points: 350,
        color: "#FFC107",
    },
    Rank {
        name: "Earth Emissary",
        min_points: 500,
        color: "#FF9800",
    },
];

impl Rank {
    /// Current and next rank for the given points
    pub fn for_points(points: u32) -> RankStanding {
        let index = RANKS
            .iter()
            .rposition(|r| points >= r.min_points)
            .unwrap_or(0);

        RankStanding {
            points,
            current: &RANKS[index],
            next: RANKS.get(index + 1),
        }
    }
}

/// Where a point total sits in the rank table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankStanding {
    pub points: u32,
    pub current: &'static Rank,
    /// None at the top rank
    pub next: Option<&'static Rank>,
}

impl RankStanding {
    /// Unclamped progress towards the next rank
    ///
    /// Can fall outside `0.0..=1.0` when the points do not actually belong
    /// to `current` (e.g. a standing built by hand from a stale ledger).
    pub fn raw_progress(&self) -> f64 {
        match self.next {
            Some(next) => {
                let span = next.min_points as f64 - self.current.min_points as f64;
                if span <= 0.0 {
                    1.0
                } else {
                    (self.points as f64 - self.current.min_points as f64) / span
                }
            }
            None => 1.0, // Top rank
        }
    }

    /// Progress towards the next rank, clamped to `0.0..=1.0` for display
    pub fn progress_fraction(&self) -> f64 {
        let raw = self.raw_progress();
        if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) }
    }

    /// Points still needed for the next rank (None at the top)
    pub fn points_to_next(&self) -> Option<u32> {
        self.next
            .map(|next| next.min_points.saturating_sub(self.points))
    }

    pub fn is_top_rank(&self) -> bool {
        self.next.is_none()
    }
}
