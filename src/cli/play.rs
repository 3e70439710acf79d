//! Play command implementation
//!
//! Reads answers line by line from stdin. `:hint`, `:next` and `:quit`
//! are commands, anything else is an answer.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use ecoquest::config::Config;
use ecoquest::domain::{PuzzleKind, TopicId, UserId};
use ecoquest::progression::{
    Outcome, ProfileView, ProgressionEngine, SessionState, SubmitReport,
};
use ecoquest::ProgressionError;

use super::build_engine;
use super::profile::print_rank;

/// Play riddles or challenges interactively
pub async fn play_command(
    config: &Config,
    user: &UserId,
    kind: PuzzleKind,
    topic: Option<TopicId>,
    ephemeral: bool,
) -> Result<()> {
    let engine = build_engine(config, ephemeral)?;

    print_rank(&engine.profile(user).await?);
    println!();

    let mut session = match engine.resume_session(user).await? {
        Some(mut stored) if stored.kind() == Some(kind) => {
            if stored.award_pending() {
                let settlement = engine.settle(user, &mut stored).await?;
                println!("Applied {} pending points from your last {}.", settlement.points_awarded, kind);
            }
            if stored.is_active() {
                println!("Resuming your current {}.", kind);
            }
            stored
        }
        _ => engine.request_session(user, kind, topic).await?,
    };

    if session.is_active() {
        print_puzzle(&session);
    } else {
        print_resolution(&session);
    }
    println!("Commands: :hint  :next  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            ":quit" | ":q" => break,
            ":hint" => match engine.reveal_hint(user, &mut session).await {
                Ok(hint) => println!("Hint: {}", hint),
                Err(e) => println!("{}", e),
            },
            ":next" => {
                if session.is_active() {
                    println!("Solve this one first (or use up your attempts).");
                    continue;
                }
                match next_session(&engine, user, kind, topic).await {
                    Some(next) => {
                        session = next;
                        print_puzzle(&session);
                    }
                    None => println!("Type :next to try again."),
                }
            }
            answer => match engine.submit_answer(user, &mut session, answer).await {
                Ok(report) => {
                    print_report(&report);
                    if session.resolved {
                        print_resolution(&session);
                        if let Some(ledger) = report.ledger {
                            print_rank(&ProfileView::from_ledger(ledger));
                        }
                        println!("Type :next for another {}.", kind);
                    }
                }
                Err(ProgressionError::OracleUnavailable(e)) => {
                    println!("Could not check your answer ({}). Please submit again.", e);
                }
                Err(e) => println!("{}", e),
            },
        }
    }

    Ok(())
}

async fn next_session(
    engine: &ProgressionEngine,
    user: &UserId,
    kind: PuzzleKind,
    topic: Option<TopicId>,
) -> Option<SessionState> {
    match engine.request_session(user, kind, topic).await {
        Ok(session) => Some(session),
        Err(e) => {
            println!("Failed to fetch a new {}: {}", kind, e);
            None
        }
    }
}

fn print_puzzle(session: &SessionState) {
    let Some(content) = &session.content else {
        return;
    };

    println!();
    if let Some(topic) = content.primary_topic() {
        let info = topic.info();
        println!("{} - {}", topic, info.name);
        println!("{}", info.description);
        println!();
    }
    println!("{}", content.question);
    println!("Difficulty: {}", content.difficulty);
    if let Some(remaining) = session.attempts_remaining() {
        println!("Attempts remaining: {}", remaining);
    }
    if session.hint_revealed {
        println!("Hint: {}", content.hint);
    }
}

fn print_report(report: &SubmitReport) {
    match report.outcome {
        Outcome::Solved => println!("Correct! +{} points", report.points_awarded),
        Outcome::Retry => match report.attempts_remaining {
            Some(remaining) => println!("Not quite. Attempts remaining: {}", remaining),
            None => println!("Not quite. Try again."),
        },
        Outcome::Exhausted => println!("Out of attempts. No points this time."),
    }
    if let Some(up) = &report.rank_up {
        println!("Rank up! {} -> {}", up.from.name, up.to.name);
    }
}

fn print_resolution(session: &SessionState) {
    let Some(content) = &session.content else {
        return;
    };
    let Some(answer) = session.revealed_answer() else {
        return;
    };

    println!();
    match content.kind {
        PuzzleKind::Riddle => println!("Answer: {}", answer),
        PuzzleKind::Challenge => println!("Suggested solution: {}", answer),
    }

    let details = &content.details;
    for (label, text) in [
        ("Did you know?", &details.did_you_know),
        ("Interesting fact:", &details.fact),
        ("Why is this important?", &details.importance),
        ("Explanation:", &details.explanation),
    ] {
        if let Some(text) = text {
            println!("{}\n  {}", label, text);
        }
    }

    let related = content.related_topics();
    if !related.is_empty() {
        let names: Vec<String> = related
            .iter()
            .map(|t| format!("{} ({})", t, t.name()))
            .collect();
        println!("Related: {}", names.join(", "));
    }
    println!();
}
