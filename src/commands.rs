//! CLI command definitions for ecoquest.

use clap::{Subcommand, ValueEnum};

use ecoquest::domain::PuzzleKind;

#[derive(Subcommand)]
pub enum Commands {
    /// Play riddles or challenges
    Play {
        #[arg(value_enum, default_value = "riddle")]
        kind: KindArg,

        /// Primary topic (1-17); random for riddles when omitted
        #[arg(long)]
        topic: Option<u8>,

        /// Keep progress in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Show points, rank and topic progress
    Profile,

    /// List the sustainability topics
    Topics,

    /// Initialize a new ~/.ecoquest/config.toml configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Riddle,
    Challenge,
}

impl From<KindArg> for PuzzleKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Riddle => PuzzleKind::Riddle,
            KindArg::Challenge => PuzzleKind::Challenge,
        }
    }
}
