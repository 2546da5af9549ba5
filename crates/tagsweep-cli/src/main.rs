//! Tagsweep CLI - keeps the newest tags of every repository in a registry project.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod sweep_file;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so that `--output json` stays parseable.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tagsweep=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Clean(args) => commands::clean::execute(*args).await,
        Commands::Version => {
            println!("tagsweep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
