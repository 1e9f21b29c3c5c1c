//! ffgraph CLI
//!
//! Round-trips ffmpeg command lines through the filter-graph compiler and
//! wraps the ffprobe/ffmpeg collaborators.
//!
//! # Usage
//!
//! ```bash
//! ffgraph parse "ffmpeg -i in.mp4 -filter_complex '[0]scale=1280:720[s1]' -map '[s1]' out.mp4"
//! ffgraph probe in.mp4
//! ffgraph run "ffmpeg -i in.mp4 out.mp4" --overwrite
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ffgraph::cli::{commands, Cli, Commands};

/// Main entry point for the ffgraph CLI application
fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --log-level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone())),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!("Starting ffgraph CLI");

    // Execute the requested command
    match cli.command {
        Commands::Parse(args) => commands::parse(args)?,
        Commands::Probe(args) => commands::probe(args)?,
        Commands::Run(args) => commands::run(args)?,
    }

    Ok(())
}
