use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Thread markdown notes into a conversation and stream chat answers
/// back into the vault
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the vault (a directory of markdown notes)
    #[arg(long, default_value = ".")]
    pub vault: PathBuf,

    /// Path to the config file (defaults to ~/.config/zettel/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// API key override (falls back to config file, then OPENAI_API_KEY)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model override
    #[arg(long)]
    pub model: Option<String>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a streamed answer note for a question note
    Ask {
        /// Name of the question note (file stem, without .md)
        note: String,
    },
    /// Create a new question note, optionally linked to a parent note
    New {
        /// Name for the new note
        name: String,

        /// Parent note to continue the conversation from
        #[arg(long)]
        parent: Option<String>,
    },
    /// Print the resolved conversation history for a note
    History {
        /// Name of the note to resolve
        note: String,
    },
}
