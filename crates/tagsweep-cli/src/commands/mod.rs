//! CLI commands and argument parsing.

pub mod clean;

use clap::{Parser, Subcommand};

/// Tagsweep - registry tag retention cleaner
#[derive(Parser)]
#[command(name = "tagsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Delete all but the newest tags of every repository in a project
    Clean(Box<clean::CleanArgs>),

    /// Print version information
    Version,
}
