//! Sustainability aptitude score
//!
//! Informational only. Nothing reads it back into the ledger, the
//! difficulty scale or the rank table.

use super::ledger::ProgressLedger;

pub const APTITUDE_BASE: f64 = 100.0;
pub const APTITUDE_CAP: u32 = 200;

/// Composite score derived from a ledger, capped at 200
pub fn aptitude_score(ledger: &ProgressLedger) -> u32 {
    let points_factor = ledger.total_points as f64 * 0.5;
    let coverage = ledger.topics_covered() as f64 * 5.0;
    let accuracy =
        ledger.solved_without_hint_count as f64 / ledger.solved_count.max(1) as f64 * 20.0;

    let score = (APTITUDE_BASE + points_factor + coverage + accuracy).round();
    (score.min(APTITUDE_CAP as f64)) as u32
}
