//! Command-line surface: submit a planning request or a correction and
//! print the resulting plan.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Drive a Banquet planning session from the command line.
#[derive(Parser)]
#[command(name = "banquet", version, about)]
pub struct Cli {
    /// Path to a `banquet.toml` configuration file. Defaults to
    /// `./banquet.toml` if present, otherwise built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Submit a new planning request and print the final plan.
    Plan {
        /// Path to a JSON file holding the planning criteria
        /// (`total_budget`, `guest_count`, `style`, and optional
        /// `venue`/`catering`/`decor` requirement blocks).
        #[arg(long)]
        criteria: PathBuf,

        /// User identifier the session and its preference history are
        /// recorded under.
        #[arg(long, default_value = "cli-user")]
        user_id: String,
    },

    /// Fork an existing session and retry it with adjusted criteria.
    Correct {
        /// The session id being corrected.
        #[arg(long)]
        session: uuid::Uuid,

        /// User identifier to record the new session under.
        #[arg(long, default_value = "cli-user")]
        user_id: String,

        /// Path to a JSON file holding criteria overrides (merged under a
        /// top-level `criteria` key); omit to simply retry unchanged.
        #[arg(long)]
        overrides: Option<PathBuf>,
    },

    /// Sweep the three knowledge graphs for low-quality nodes, enrich the
    /// ones worth repairing, and persist any improvement.
    Enrich,
}
