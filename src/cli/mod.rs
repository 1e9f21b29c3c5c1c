//! CLI module for ffgraph
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// ffgraph command-line front end
///
/// Builds, compiles, and parses ffmpeg filter graphs: round-trip an existing
/// command line, probe media files, or execute a parsed command.
#[derive(Parser)]
#[command(name = "ffgraph")]
#[command(about = "Build, compile, and parse ffmpeg filter graphs")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level when RUST_LOG is not set
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Parse an ffmpeg command line and print it back normalized
    Parse(args::ParseArgs),
    /// Inspect a media file with ffprobe
    Probe(args::ProbeArgs),
    /// Parse an ffmpeg command line and execute it
    Run(args::RunArgs),
}
