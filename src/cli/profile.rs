//! Profile command implementation

use anyhow::Result;

use ecoquest::config::Config;
use ecoquest::domain::UserId;
use ecoquest::progression::ProfileView;

use super::build_engine;

const BAR_WIDTH: usize = 30;

/// Text progress bar for a fraction already clamped to 0..=1
pub fn progress_bar(fraction: f64) -> String {
    let filled = (fraction * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Print rank header lines shared by `profile` and `play`
pub fn print_rank(view: &ProfileView) {
    let standing = &view.standing;
    println!(
        "{} ({} points, badge {})",
        standing.current.name, view.ledger.total_points, standing.current.color
    );
    match standing.next {
        Some(next) => println!(
            "Next rank: {} {} {:.0}% ({} to go)",
            next.name,
            progress_bar(view.progress_fraction),
            view.progress_fraction * 100.0,
            standing.points_to_next().unwrap_or(0)
        ),
        None => println!("Max rank achieved!"),
    }
}

/// Show the user's progress
pub async fn profile_command(config: &Config, user: &UserId) -> Result<()> {
    let engine = build_engine(config, false)?;
    let view = engine.profile(user).await?;

    println!("Profile: {}\n", user);
    print_rank(&view);
    println!();
    println!("  Total points:          {}", view.ledger.total_points);
    println!("  Puzzles solved:        {}", view.ledger.solved_count);
    println!("  Solved without hints:  {}", view.ledger.solved_without_hint_count);
    println!("  Sustainability IQ:     {}", view.aptitude);
    println!();

    if view.ledger.topic_progress.is_empty() {
        println!("No topic progress yet.");
    } else {
        println!("Topic progress:");
        for (topic, count) in &view.ledger.topic_progress {
            println!("  {:>2}. {:<42} {}", topic.get(), topic.name(), count);
        }
    }

    Ok(())
}
