use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use ecoquest::config::Config;
use ecoquest::domain::{TopicId, UserId};

mod cli;
mod commands;

use commands::Commands;

#[derive(Parser)]
#[command(name = "ecoquest")]
#[command(about = "Sustainability riddles and challenges with ranks and points")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.ecoquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Player whose progress to use
    #[arg(short, long, global = true, default_value = "local")]
    user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(cli.config, force).await?;
        }
        Commands::Topics => {
            cli::topics::topics_command();
        }
        Commands::Profile => {
            let config = Config::load(cli.config.as_deref())?;
            let user = UserId::new(cli.user)?;
            cli::profile::profile_command(&config, &user).await?;
        }
        Commands::Play {
            kind,
            topic,
            ephemeral,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let user = UserId::new(cli.user)?;
            let topic = topic.map(TopicId::new).transpose()?;
            cli::play::play_command(&config, &user, kind.into(), topic, ephemeral).await?;
        }
    }

    Ok(())
}
